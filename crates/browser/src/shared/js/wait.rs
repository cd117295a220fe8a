pub const CHECK_LOADING: &str = r#"
() => JSON.stringify({
    readyState: document.readyState,
    activeRequests: performance.getEntriesByType('resource').filter(r => !r.responseEnd).length
})
"#;
