use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn dossier_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("dossier"))
}

fn init_config(temp_dir: &TempDir) -> PathBuf {
    let config_path = temp_dir.path().join("dossier-config");
    dossier_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();
    config_path
}

fn run(config_path: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
    dossier_cmd()
        .arg("-C")
        .arg(config_path)
        .args(args)
        .assert()
}

fn read_state(config_path: &Path) -> String {
    fs::read_to_string(config_path.join("state.toml")).unwrap()
}

fn html_files(config_path: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(config_path.join("output"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "html"))
        .collect();
    files.sort();
    files
}

#[test]
fn test_help() {
    dossier_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("invoices, quotes and document templates"));
}

#[test]
fn test_version() {
    dossier_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dossier"));
}

#[test]
fn test_init_creates_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("dossier-config");

    dossier_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized dossier config"));

    assert!(config_path.join("config.toml").exists());
    assert!(config_path.join("contacts.toml").exists());
    assert!(config_path.join("items.toml").exists());
    assert!(config_path.join("templates.toml").exists());
    assert!(config_path.join("templates/factuur.html").exists());
    assert!(config_path.join("templates/offerte.html").exists());
}

#[test]
fn test_init_fails_if_exists() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    run(&config_path, &["init"])
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_status_without_init() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nonexistent");

    run(&config_path, &["status"])
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_status() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    run(&config_path, &["status"])
        .success()
        .stdout(predicate::str::contains("Dossier Status"))
        .stdout(predicate::str::contains("Templates:        2"))
        .stdout(predicate::str::contains("Next quote:       OFF-"));
}

#[test]
fn test_contacts_and_items_list() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    run(&config_path, &["contacts"])
        .success()
        .stdout(predicate::str::contains("jansen"))
        .stdout(predicate::str::contains("Jansen Holding B.V."));

    run(&config_path, &["items"])
        .success()
        .stdout(predicate::str::contains("consult"))
        .stdout(predicate::str::contains("€195.00"))
        .stdout(predicate::str::contains("0%"));
}

#[test]
fn test_templates_selection() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    run(&config_path, &["templates"])
        .success()
        .stdout(predicate::str::contains("factuur-standaard"))
        .stdout(predicate::str::contains("offerte-standaard"));

    run(&config_path, &["templates", "--type", "factuur"])
        .success()
        .stdout(predicate::str::contains("Selected: factuur-standaard"))
        .stdout(predicate::str::contains("offerte-standaard").not());

    run(&config_path, &["templates", "--tag", "OFFERTE"])
        .success()
        .stdout(predicate::str::contains("Selected: offerte-standaard"));

    run(&config_path, &["templates", "--type", "brief"])
        .success()
        .stdout(predicate::str::contains("No active templates match"));
}

#[test]
fn test_generate_missing_contact() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    run(
        &config_path,
        &["invoice", "--contact", "nonexistent", "--item", "consult:2", "--no-pdf"],
    )
    .failure()
    .stderr(predicate::str::contains("Contact 'nonexistent' not found"));
}

#[test]
fn test_generate_missing_item() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    run(
        &config_path,
        &["invoice", "--contact", "jansen", "--item", "nonexistent:8", "--no-pdf"],
    )
    .failure()
    .stderr(predicate::str::contains("Item 'nonexistent' not found"));
}

#[test]
fn test_generate_invalid_quantity() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    run(
        &config_path,
        &["invoice", "--contact", "jansen", "--item", "consult:abc", "--no-pdf"],
    )
    .failure()
    .stderr(predicate::str::contains("Invalid quantity"));
}

#[test]
fn test_generate_no_items() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    run(&config_path, &["quote", "--contact", "jansen", "--no-pdf"])
        .failure()
        .stderr(predicate::str::contains("No items specified"));
}

#[test]
fn test_generate_unknown_template() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    run(
        &config_path,
        &[
            "invoice", "--contact", "jansen", "--item", "consult:1", "--template", "offerte-standaard",
            "--no-pdf",
        ],
    )
    .failure()
    .stderr(predicate::str::contains("Template 'offerte-standaard' not found"));
}

#[test]
fn test_generate_without_matching_template() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    let registry = fs::read_to_string(config_path.join("templates.toml")).unwrap();
    let registry = registry.replacen("type = \"factuur\"", "type = \"brief\"", 1);
    fs::write(config_path.join("templates.toml"), registry).unwrap();

    run(
        &config_path,
        &["invoice", "--contact", "jansen", "--item", "consult:1", "--no-pdf"],
    )
    .failure()
    .stderr(predicate::str::contains("No active factuur template"));
}

#[test]
fn test_generate_invoice_renders_html() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    run(
        &config_path,
        &["invoice", "--contact", "jansen", "--item", "consult:2", "--no-pdf"],
    )
    .success()
    .stdout(predicate::str::contains("Generated invoice"))
    .stdout(predicate::str::contains("Template: factuur-standaard"))
    .stdout(predicate::str::contains("Subtotal: €390.00"))
    .stdout(predicate::str::contains("VAT:      €81.90"))
    .stdout(predicate::str::contains("Total:    €471.90"))
    .stdout(predicate::str::contains("PDF:").not());

    let files = html_files(&config_path);
    assert_eq!(files.len(), 1);
    let html = fs::read_to_string(&files[0]).unwrap();
    assert!(html.contains("Jansen Holding B.V."));
    assert!(html.contains("Juridisch advies"));
    assert!(html.contains("€471.90"));
    assert!(!html.contains("%LINE_ITEMS%"));

    let state = read_state(&config_path);
    assert!(state.contains("kind = \"invoice\""));
    assert!(state.contains("action = \"generate\""));
}

#[test]
fn test_quote_keeps_last_line() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    run(
        &config_path,
        &[
            "quote", "--contact", "jansen", "--item", "consult:1", "--item", "griffierecht:1",
            "--no-pdf",
        ],
    )
    .success()
    .stdout(predicate::str::contains("Generated quote OFF-"))
    .stdout(predicate::str::contains("Total:    €555.95"));

    run(&config_path, &["remove-line", "1", "2", "--no-pdf"])
        .success()
        .stdout(predicate::str::contains("Removed line 2: Griffierecht"))
        .stdout(predicate::str::contains("Total:    €235.95"));

    run(&config_path, &["remove-line", "1", "1", "--no-pdf"])
        .failure()
        .stderr(predicate::str::contains("must keep at least one line"));

    run(&config_path, &["remove-line", "1", "5", "--no-pdf"])
        .failure()
        .stderr(predicate::str::contains("Invalid line 5"));
}

#[test]
fn test_invoice_can_drop_every_line() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    run(
        &config_path,
        &["invoice", "--contact", "jansen", "--item", "consult:1", "--no-pdf"],
    )
    .success();

    run(&config_path, &["remove-line", "1", "1", "--no-pdf"])
        .success()
        .stdout(predicate::str::contains("Total:    €0.00"));
}

#[test]
fn test_set_and_add_lines() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    run(
        &config_path,
        &["invoice", "--contact", "jansen", "--item", "consult:1", "--no-pdf"],
    )
    .success();

    run(
        &config_path,
        &["set-line", "1", "1", "--quantity", "3", "--vat", "9", "--no-pdf"],
    )
    .success()
    .stdout(predicate::str::contains("Subtotal: €585.00"))
    .stdout(predicate::str::contains("VAT:      €52.65"));

    run(
        &config_path,
        &["add-line", "1", "--item", "griffierecht:1", "--no-pdf"],
    )
    .success()
    .stdout(predicate::str::contains("Subtotal: €905.00"))
    .stdout(predicate::str::contains("Total:    €957.65"));

    run(&config_path, &["edit", "1", "--item", "dossierbehandeling:2", "--no-pdf"])
        .success()
        .stdout(predicate::str::contains("Subtotal: €300.00"))
        .stdout(predicate::str::contains("Items:    dossierbehandeling:2"));
}

#[test]
fn test_convert_quote_to_invoice() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    run(
        &config_path,
        &["quote", "--contact", "jansen", "--item", "consult:2", "--no-pdf"],
    )
    .success();

    run(&config_path, &["convert", "1", "--no-pdf"])
        .success()
        .stdout(predicate::str::contains("Converted quote OFF-"))
        .stdout(predicate::str::contains("Generated invoice"))
        .stdout(predicate::str::contains("Total:    €471.90"));

    // the quote is now second in the list
    run(&config_path, &["convert", "2", "--no-pdf"])
        .failure()
        .stderr(predicate::str::contains("already converted"));

    run(&config_path, &["convert", "1", "--no-pdf"])
        .failure()
        .stderr(predicate::str::contains("is not a quote"));

    run(&config_path, &["list"])
        .success()
        .stdout(predicate::str::contains("converted to"))
        .stdout(predicate::str::contains("from OFF-"))
        .stdout(predicate::str::contains("Total: 2 documents"));

    run(&config_path, &["list", "--kind", "quote"])
        .success()
        .stdout(predicate::str::contains("invoice ").not());

    assert_eq!(html_files(&config_path).len(), 2);
}

#[test]
fn test_history_records_actions() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    run(&config_path, &["history"])
        .success()
        .stdout(predicate::str::contains("No history recorded yet"));

    run(
        &config_path,
        &["invoice", "--contact", "jansen", "--item", "consult:1", "--no-pdf"],
    )
    .success();
    run(&config_path, &["regenerate", "1", "--no-pdf"])
        .success()
        .stdout(predicate::str::contains("Regenerated invoice"));

    run(&config_path, &["history"])
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("regenerate"));

    run(&config_path, &["history", "--document", "nope"])
        .success()
        .stdout(predicate::str::contains("No history recorded yet"));
}

#[test]
fn test_open_unknown_document() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    run(&config_path, &["open", "7"])
        .failure()
        .stderr(predicate::str::contains("Invalid document index"));

    run(&config_path, &["open", "2026-999"])
        .failure()
        .stderr(predicate::str::contains("Document '2026-999' not found"));
}

fn register_template(config_path: &Path, id: &str, doc_type: &str, tags: &str, created: &str) {
    let mut registry = fs::read_to_string(config_path.join("templates.toml")).unwrap();
    registry.push_str(&format!(
        "\n[{id}]\nname = \"{id}\"\ntype = \"{doc_type}\"\nfile = \"factuur.html\"\n\
         created_at = \"{created}\"\ntags = [{tags}]\n"
    ));
    fs::write(config_path.join("templates.toml"), registry).unwrap();
}

fn rewrite_state(config_path: &Path, f: impl Fn(&str) -> String) {
    let state = read_state(config_path);
    let rewritten: Vec<String> = state.lines().map(|line| f(line)).collect();
    fs::write(config_path.join("state.toml"), rewritten.join("\n")).unwrap();
}

#[test]
fn test_set_line_rejects_invalid_values() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    run(
        &config_path,
        &["invoice", "--contact", "jansen", "--item", "consult:1", "--no-pdf"],
    )
    .success();

    run(&config_path, &["set-line", "1", "1", "--quantity=-5", "--no-pdf"])
        .failure()
        .stderr(predicate::str::contains("Invalid quantity '-5'"));

    run(&config_path, &["set-line", "1", "1", "--quantity", "NaN", "--no-pdf"])
        .failure()
        .stderr(predicate::str::contains("Invalid quantity"));

    run(&config_path, &["set-line", "1", "1", "--vat", "250", "--no-pdf"])
        .failure()
        .stderr(predicate::str::contains("Invalid VAT rate '250'"));

    run(&config_path, &["set-line", "1", "1", "--price", "inf", "--no-pdf"])
        .failure()
        .stderr(predicate::str::contains("Invalid unit price"));

    // a rejected edit leaves the stored document untouched
    run(&config_path, &["regenerate", "1", "--no-pdf"])
        .success()
        .stdout(predicate::str::contains("Subtotal: €195.00"))
        .stdout(predicate::str::contains("Total:    €235.95"));
    assert!(!read_state(&config_path).contains("update-line"));
}

#[test]
fn test_tag_selected_template_survives_edits() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);
    register_template(&config_path, "zakelijk", "custom", "\"Zakelijk\"", "2026-02-01T00:00:00Z");

    run(
        &config_path,
        &["invoice", "--contact", "jansen", "--item", "consult:1", "--tag", "zakelijk", "--no-pdf"],
    )
    .success()
    .stdout(predicate::str::contains("Template: zakelijk"));
    assert!(read_state(&config_path).contains("template_tag = \"zakelijk\""));

    run(&config_path, &["regenerate", "1", "--no-pdf"])
        .success()
        .stdout(predicate::str::contains("Template: zakelijk"))
        .stderr(predicate::str::contains("no longer available").not());

    run(&config_path, &["add-line", "1", "--item", "griffierecht:1", "--no-pdf"])
        .success()
        .stdout(predicate::str::contains("Template: zakelijk"));

    run(&config_path, &["set-line", "1", "1", "--quantity", "2", "--no-pdf"])
        .success()
        .stdout(predicate::str::contains("Template: zakelijk"));

    run(&config_path, &["remove-line", "1", "2", "--no-pdf"])
        .success()
        .stdout(predicate::str::contains("Template: zakelijk"));
}

#[test]
fn test_generate_with_unmatched_tag() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    run(
        &config_path,
        &["invoice", "--contact", "jansen", "--item", "consult:1", "--tag", "brief", "--no-pdf"],
    )
    .failure()
    .stderr(predicate::str::contains("No active factuur template"));
}

#[test]
fn test_explicit_template_survives_regenerate() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);
    register_template(&config_path, "factuur-kort", "factuur", "", "2026-03-01T00:00:00Z");

    run(
        &config_path,
        &[
            "invoice", "--contact", "jansen", "--item", "consult:1", "--template", "factuur-kort",
            "--no-pdf",
        ],
    )
    .success()
    .stdout(predicate::str::contains("Template: factuur-kort"));

    run(&config_path, &["regenerate", "1", "--no-pdf"])
        .success()
        .stdout(predicate::str::contains("Template: factuur-kort"));

    run(&config_path, &["add-line", "1", "--item", "consult:1", "--no-pdf"])
        .success()
        .stdout(predicate::str::contains("Template: factuur-kort"));

    // without a choice the default still wins
    run(
        &config_path,
        &["invoice", "--contact", "jansen", "--item", "consult:1", "--no-pdf"],
    )
    .success()
    .stdout(predicate::str::contains("Template: factuur-standaard"));
}

#[test]
fn test_templates_tag_selection_prefers_given_type() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);
    register_template(&config_path, "zakelijk", "custom", "\"Zakelijk\"", "2026-02-01T00:00:00Z");
    register_template(
        &config_path,
        "factuur-zakelijk",
        "factuur",
        "\"zakelijk\"",
        "2026-01-15T00:00:00Z",
    );

    run(&config_path, &["templates", "--tag", "ZAKELIJK"])
        .success()
        .stdout(predicate::str::contains("Selected: zakelijk"));

    run(&config_path, &["templates", "--tag", "zakelijk", "--for", "factuur"])
        .success()
        .stdout(predicate::str::contains("Selected: factuur-zakelijk"));
}

#[test]
fn test_document_status_lifecycle() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    run(
        &config_path,
        &["invoice", "--contact", "jansen", "--item", "consult:1", "--no-pdf"],
    )
    .success();

    run(&config_path, &["list"])
        .success()
        .stdout(predicate::str::contains("STATUS"))
        .stdout(predicate::str::contains("draft"));

    run(&config_path, &["set-status", "1", "sent"])
        .success()
        .stdout(predicate::str::contains("draft -> sent"));

    run(&config_path, &["set-status", "1", "accepted"])
        .failure()
        .stderr(predicate::str::contains("cannot be set on invoice"));

    // a sent invoice past its due date shows as overdue
    rewrite_state(&config_path, |line| {
        if line.trim_start().starts_with("due_date = ") {
            "due_date = \"2000-01-31\"".to_string()
        } else {
            line.to_string()
        }
    });
    run(&config_path, &["list"])
        .success()
        .stdout(predicate::str::contains("overdue"));

    run(&config_path, &["set-status", "1", "paid"])
        .success()
        .stdout(predicate::str::contains("sent -> paid"));
    run(&config_path, &["list"])
        .success()
        .stdout(predicate::str::contains("paid"))
        .stdout(predicate::str::contains("overdue").not());

    run(&config_path, &["set-status", "1", "paid"])
        .success()
        .stdout(predicate::str::contains("already paid"));

    run(&config_path, &["history"])
        .success()
        .stdout(predicate::str::contains("set-status"));
}

#[test]
fn test_converted_quote_is_accepted() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    run(
        &config_path,
        &["quote", "--contact", "jansen", "--item", "consult:1", "--no-pdf"],
    )
    .success();

    run(&config_path, &["set-status", "1", "paid"])
        .failure()
        .stderr(predicate::str::contains("cannot be set on quote"));

    run(&config_path, &["convert", "1", "--no-pdf"]).success();

    run(&config_path, &["list", "--kind", "quote"])
        .success()
        .stdout(predicate::str::contains("accepted"));
}

#[test]
fn test_number_format_with_slash() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = init_config(&temp_dir);

    let config = fs::read_to_string(config_path.join("config.toml")).unwrap();
    let config = config.replacen("\"{year}-{seq:03}\"", "\"{year}/{seq:03}\"", 1);
    fs::write(config_path.join("config.toml"), config).unwrap();

    run(
        &config_path,
        &["invoice", "--contact", "jansen", "--item", "consult:1", "--no-pdf"],
    )
    .success()
    .stdout(predicate::str::contains("/001"));

    let files = html_files(&config_path);
    assert_eq!(files.len(), 1);
    let name = files[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.ends_with("-001.html"), "unexpected file name {name}");

    run(&config_path, &["regenerate", "1", "--no-pdf"]).success();
    assert_eq!(html_files(&config_path).len(), 1);
}
