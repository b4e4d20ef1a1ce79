/// Supported languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    English,
    Arabic,
}

/// Reading direction applied to the whole interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl Language {
    /// Parse a stored language code. Unknown values fall back to English.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_lowercase().as_str() {
            "ar" => Self::Arabic,
            "en" => Self::English,
            _ => Self::English,
        }
    }

    /// Code sent to the API and persisted in config
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Arabic => "ar",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Self::English => Self::Arabic,
            Self::Arabic => Self::English,
        }
    }

    pub fn direction(&self) -> TextDirection {
        match self {
            Self::English => TextDirection::Ltr,
            Self::Arabic => TextDirection::Rtl,
        }
    }

    /// Get strings for this language
    pub fn strings(&self) -> &'static Strings {
        match self {
            Self::English => &EN,
            Self::Arabic => &AR,
        }
    }
}

impl serde::Serialize for Language {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

/// All translatable strings. Each language is a `const Strings`.
#[derive(Debug)]
pub struct Strings {
    // Placeholders
    pub chat_placeholder: &'static str,
    pub app_placeholder: &'static str,
    pub sel_min: &'static str,
    pub up_min: &'static str,
    pub t_k: &'static str,
    pub p_bar: &'static str,
    pub humidity: &'static str,
    pub mof_name: &'static str,
    pub cif_url: &'static str,

    // Titles
    pub forward_title: &'static str,
    pub inverse_title: &'static str,
    pub tab_chat: &'static str,
    pub tab_forward: &'static str,
    pub tab_inverse: &'static str,

    // Buttons
    pub btn_send: &'static str,
    pub btn_search: &'static str,
    pub btn_predict: &'static str,

    // Messages
    pub loading: &'static str,
    pub api_error: &'static str,
    pub cancelled: &'static str,
    pub chat_empty: &'static str,
    pub output_empty: &'static str,
    pub you: &'static str,
    pub bot: &'static str,

    // Connection status
    pub status_checking: &'static str,
    pub status_connected: &'static str,
    pub status_disconnected: &'static str,

    // Footer hints
    pub hint_tabs: &'static str,
    pub hint_edit: &'static str,
    pub hint_submit: &'static str,
    pub hint_lang: &'static str,
    pub hint_cancel: &'static str,
    pub hint_quit: &'static str,
}

/// English strings
pub const EN: Strings = Strings {
    chat_placeholder: "e.g., best MOFs for CO2?",
    app_placeholder: "application (e.g., CO2_capture, H2_storage)",
    sel_min: "Min selectivity (optional)",
    up_min: "Min uptake mmol/g (optional)",
    t_k: "T (K)",
    p_bar: "P (bar)",
    humidity: "Humidity %",
    mof_name: "MOF name (e.g., HKUST-1)",
    cif_url: "CIF URL (optional)",

    forward_title: "Forward: Application → MOF",
    inverse_title: "Inverse: MOF → Applications",
    tab_chat: "Chat",
    tab_forward: "Forward",
    tab_inverse: "Inverse",

    btn_send: "Send",
    btn_search: "Search",
    btn_predict: "Predict",

    loading: "Loading…",
    api_error: "Error contacting API",
    cancelled: "Request cancelled",
    chat_empty: "Ask about metal-organic frameworks...",
    output_empty: "Results appear here",
    you: "you",
    bot: "bot",

    status_checking: "Checking backend…",
    status_connected: "🔗 Connected to backend",
    status_disconnected: "❌ Disconnected",

    hint_tabs: "tabs",
    hint_edit: "edit",
    hint_submit: "run",
    hint_lang: "عربي",
    hint_cancel: "cancel",
    hint_quit: "quit",
};

/// Arabic strings
pub const AR: Strings = Strings {
    chat_placeholder: "مثال: افضل MOFs لالتقاط CO2؟",
    app_placeholder: "التطبيق (مثال: CO2_capture, H2_storage)",
    sel_min: "أدنى انتقائية (اختياري)",
    up_min: "أدنى التقاط mmol/g (اختياري)",
    t_k: "درجة الحرارة (كلفن)",
    p_bar: "الضغط (بار)",
    humidity: "الرطوبة %",
    mof_name: "اسم المادة (مثال: HKUST-1)",
    cif_url: "رابط CIF (اختياري)",

    forward_title: "تطبيق → مادة (Forward)",
    inverse_title: "مادة → تطبيقات (Inverse)",
    tab_chat: "محادثة",
    tab_forward: "تطبيق → مادة",
    tab_inverse: "مادة → تطبيقات",

    btn_send: "إرسال",
    btn_search: "بحث",
    btn_predict: "تنبؤ",

    loading: "جاري التحميل…",
    api_error: "تعذّر الاتصال بالـ API",
    cancelled: "تم إلغاء الطلب",
    chat_empty: "اسأل عن الأطر المعدنية العضوية...",
    output_empty: "تظهر النتائج هنا",
    you: "أنت",
    bot: "المساعد",

    status_checking: "جاري فحص الخادم…",
    status_connected: "🔗 متصل بالخادم",
    status_disconnected: "❌ غير متصل",

    hint_tabs: "التبويبات",
    hint_edit: "تحرير",
    hint_submit: "تنفيذ",
    hint_lang: "English",
    hint_cancel: "إلغاء",
    hint_quit: "خروج",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_codes_fall_back_to_english() {
        assert_eq!(Language::from_code("ar"), Language::Arabic);
        assert_eq!(Language::from_code("AR"), Language::Arabic);
        assert_eq!(Language::from_code("en"), Language::English);
        assert_eq!(Language::from_code("fr"), Language::English);
        assert_eq!(Language::from_code(""), Language::English);
    }

    #[test]
    fn toggle_twice_is_identity() {
        for lang in [Language::English, Language::Arabic] {
            assert_ne!(lang.toggled(), lang);
            assert_eq!(lang.toggled().toggled(), lang);
        }
    }

    #[test]
    fn arabic_reads_right_to_left() {
        assert_eq!(Language::Arabic.direction(), TextDirection::Rtl);
        assert_eq!(Language::English.direction(), TextDirection::Ltr);
    }

    #[test]
    fn serializes_as_code() {
        let json = serde_json::to_string(&Language::Arabic).unwrap();
        assert_eq!(json, "\"ar\"");
    }
}
