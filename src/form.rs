use crate::api::{Constraints, ForwardRequest, InverseRequest, Material, OperatingConditions};
use crate::i18n::{Language, Strings};
use crate::tabs::Tab;

/// Used when the application field is left blank
pub const DEFAULT_APPLICATION: &str = "CO2_capture";
/// Used when the MOF name field is left blank
pub const DEFAULT_MATERIAL: &str = "UiO-66-NH2";

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Parse an optional numeric field. Anything that is not a finite number is "no value".
pub fn num_or_null(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|x| x.is_finite())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputField {
    pub value: String,
    pub cursor: usize, // cursor position in value, in chars
    pub placeholder: &'static str,
}

impl InputField {
    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.value, self.cursor);
        self.value.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.value.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Trimmed value, or `None` when blank
    pub fn text(&self) -> Option<&str> {
        Some(self.value.trim()).filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldId {
    ChatInput,
    Application,
    SelectivityMin,
    UptakeMin,
    TemperatureK,
    PressureBar,
    Humidity,
    MofName,
    CifUrl,
}

impl FieldId {
    pub const ALL: [FieldId; 9] = [
        FieldId::ChatInput,
        FieldId::Application,
        FieldId::SelectivityMin,
        FieldId::UptakeMin,
        FieldId::TemperatureK,
        FieldId::PressureBar,
        FieldId::Humidity,
        FieldId::MofName,
        FieldId::CifUrl,
    ];

    pub fn placeholder(self, strings: &Strings) -> &'static str {
        match self {
            FieldId::ChatInput => strings.chat_placeholder,
            FieldId::Application => strings.app_placeholder,
            FieldId::SelectivityMin => strings.sel_min,
            FieldId::UptakeMin => strings.up_min,
            FieldId::TemperatureK => strings.t_k,
            FieldId::PressureBar => strings.p_bar,
            FieldId::Humidity => strings.humidity,
            FieldId::MofName => strings.mof_name,
            FieldId::CifUrl => strings.cif_url,
        }
    }

    /// Fields of a panel, in focus order
    pub fn for_tab(tab: Tab) -> &'static [FieldId] {
        match tab {
            Tab::Chat => &[FieldId::ChatInput],
            Tab::Forward => &[
                FieldId::Application,
                FieldId::SelectivityMin,
                FieldId::UptakeMin,
                FieldId::TemperatureK,
                FieldId::PressureBar,
                FieldId::Humidity,
            ],
            Tab::Inverse => &[FieldId::MofName, FieldId::CifUrl],
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            FieldId::SelectivityMin
                | FieldId::UptakeMin
                | FieldId::TemperatureK
                | FieldId::PressureBar
                | FieldId::Humidity
        )
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }
}

/// Every input of the interface, addressed by `FieldId`
#[derive(Debug, Default)]
pub struct Fields {
    inputs: [InputField; 9],
}

impl Fields {
    pub fn new(strings: &Strings) -> Self {
        let mut fields = Self::default();
        fields.apply_language(strings);
        fields
    }

    pub fn get(&self, id: FieldId) -> &InputField {
        &self.inputs[id.index()]
    }

    pub fn get_mut(&mut self, id: FieldId) -> &mut InputField {
        &mut self.inputs[id.index()]
    }

    /// Refresh every placeholder from the given string table
    pub fn apply_language(&mut self, strings: &Strings) {
        for id in FieldId::ALL {
            self.get_mut(id).placeholder = id.placeholder(strings);
        }
    }

    pub fn forward_request(&self, lang: Language) -> ForwardRequest {
        let num = |id| num_or_null(&self.get(id).value);
        ForwardRequest {
            application: self
                .get(FieldId::Application)
                .text()
                .unwrap_or(DEFAULT_APPLICATION)
                .to_string(),
            constraints: Constraints {
                selectivity_min: num(FieldId::SelectivityMin),
                uptake_min_mmol_g: num(FieldId::UptakeMin),
                operating_conditions: OperatingConditions {
                    t_k: num(FieldId::TemperatureK),
                    p_bar: num(FieldId::PressureBar),
                    humidity_pct: num(FieldId::Humidity),
                },
            },
            lang,
        }
    }

    pub fn inverse_request(&self, lang: Language) -> InverseRequest {
        InverseRequest {
            material: Material {
                name: self
                    .get(FieldId::MofName)
                    .text()
                    .unwrap_or(DEFAULT_MATERIAL)
                    .to_string(),
                cif_url: self.get(FieldId::CifUrl).text().map(str::to_string),
            },
            lang,
        }
    }
}
