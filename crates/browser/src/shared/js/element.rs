// Declarations for `Runtime.callFunctionOn`, `this` is the element.

/// Serialized as a string so the value survives without `returnByValue`.
pub const ELEMENT_STATE: &str = r#"
function() {
    const rect = this.getBoundingClientRect();
    const style = window.getComputedStyle(this);
    return JSON.stringify({
        width: rect.width,
        height: rect.height,
        display: style.display,
        visibility: style.visibility,
        opacity: style.opacity
    });
}
"#;

pub const TEXT_OR_VALUE: &str = r#"
function() {
    const text = this.textContent || '';
    if (text.length > 0) return text;
    return typeof this.value === 'string' ? this.value : '';
}
"#;

pub const CLICK: &str = r#"
function() {
    this.click();
    return true;
}
"#;
