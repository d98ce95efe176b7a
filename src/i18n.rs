// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持英文（默认）和巴西葡语
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// 注意: 引擎输出的原因/消息文本不经过翻译
// ==========================================

use crate::config::normalize_locale;

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言（不支持的语言回退为 en）
///
/// # 参数
/// - locale: 语言代码（"en" 或 "pt-BR"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(&normalize_locale(locale));
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use parts_qc::i18n::t;
/// let msg = t("menu.title");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use parts_qc::i18n::t_with_args;
/// let msg = t_with_args("input.duplicate_id", &[("id", "P001")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

// rust-i18n 的 locale 为全局状态，且 Rust 测试默认并行执行；
// 为避免测试互相干扰，这里对 i18n 相关测试串行化。
#[cfg(test)]
pub(crate) static LOCALE_TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
