use super::*;
use tempfile::TempDir;

fn store_with_templates(templates: &[(&str, &str)]) -> (PromptStore, TempDir) {
    let temp_dir = TempDir::new().expect("should create temp dir");
    for (name, content) in templates {
        fs::write(temp_dir.path().join(format!("{name}.txt")), content)
            .expect("should write template");
    }
    (PromptStore::new(temp_dir.path()), temp_dir)
}

#[test]
fn load_returns_file_content() {
    let (store, _dir) = store_with_templates(&[("greeting", "Hello {name}!")]);

    let content = store.load("greeting").expect("should load template");
    assert_eq!(content, "Hello {name}!");
}

#[test]
fn missing_template_error_lists_alternatives() {
    let (store, _dir) = store_with_templates(&[
        ("category_analysis", "analyze {query}"),
        ("response_generation", "respond to {query}"),
    ]);

    let err = store.load("nonexistent").expect_err("should fail");
    let message = err.to_string();
    assert!(message.contains("nonexistent.txt"));
    assert!(message.contains("category_analysis"));
    assert!(message.contains("response_generation"));
}

#[test]
fn list_available_is_sorted_and_filtered() {
    let (store, dir) = store_with_templates(&[("zeta", "z"), ("alpha", "a")]);
    fs::write(dir.path().join("ignored.md"), "not a template").expect("should write file");

    assert_eq!(
        store.list_available(),
        vec!["alpha".to_string(), "zeta".to_string()]
    );
}

#[test]
fn load_serves_from_cache() {
    let (store, dir) = store_with_templates(&[("greeting", "original")]);

    assert_eq!(store.load("greeting").expect("should load"), "original");

    // Mutate the file; the cached copy should still be served
    fs::write(dir.path().join("greeting.txt"), "changed").expect("should rewrite");
    assert_eq!(store.load("greeting").expect("should load"), "original");
}

#[test]
fn reload_bypasses_cache() {
    let (store, dir) = store_with_templates(&[("greeting", "original")]);
    store.load("greeting").expect("should load");

    fs::write(dir.path().join("greeting.txt"), "changed").expect("should rewrite");
    assert_eq!(store.reload("greeting").expect("should reload"), "changed");
}

#[test]
fn clear_cache_forces_fresh_reads() {
    let (store, dir) = store_with_templates(&[("greeting", "original")]);
    store.load("greeting").expect("should load");

    fs::write(dir.path().join("greeting.txt"), "changed").expect("should rewrite");
    store.clear_cache().expect("should clear cache");
    assert_eq!(store.load("greeting").expect("should load"), "changed");
}

#[test]
fn render_substitutes_placeholders() {
    let rendered = render(
        "Find {query} under {budget}, query again: {query}",
        &[("query", "laptops"), ("budget", "R$ 2000")],
    );
    assert_eq!(rendered, "Find laptops under R$ 2000, query again: laptops");
}

#[test]
fn render_leaves_unknown_placeholders() {
    assert_eq!(render("{known} and {unknown}", &[("known", "x")]), "x and {unknown}");
}
