/// Installs one observer per document; each record batch calls the binding
/// with the number of added nodes.
pub const INSTALL_OBSERVER: &str = r#"
(binding) => {
    if (window.__unbannerObserver) return false;
    const target = document.body || document.documentElement;
    if (!target) return false;
    const observer = new MutationObserver((records) => {
        let added = 0;
        for (const record of records) added += record.addedNodes.length;
        window[binding](String(added));
    });
    observer.observe(target, { childList: true, subtree: true });
    window.__unbannerObserver = observer;
    return true;
}
"#;

pub const DISCONNECT_OBSERVER: &str = r#"
() => {
    const observer = window.__unbannerObserver;
    if (!observer) return false;
    observer.disconnect();
    delete window.__unbannerObserver;
    return true;
}
"#;
