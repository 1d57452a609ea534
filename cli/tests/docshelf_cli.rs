use anyhow::Result;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use pretty_assertions::assert_eq;
use serde_json::Value as JsonValue;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const DATASET: &str = r##"{
    "roles": [
        {
            "id": "maintenance",
            "name": "Maintenance",
            "description": "Keeping the boat running",
            "icon": "engineering",
            "categories": [
                {"id": "m1", "title": "Engine Maintenance", "description": "covers oil changes", "slug": "eng/maint", "contentPath": "docs/eng/maint.md"},
                {"id": "m2", "title": "Hull", "description": "", "slug": "eng/hull", "contentPath": "docs/eng/hull.md"}
            ]
        },
        {
            "id": "crew",
            "name": "Crew",
            "categories": [
                {"id": "c1", "title": "Safety", "description": "", "slug": "crew/safety", "content": "# Safety\n\n## Life jackets\n"},
                {"id": "c2", "title": "Placeholder", "description": "", "slug": "crew/todo"}
            ]
        }
    ]
}"##;

fn fixture() -> Result<TempDir> {
    let dir = TempDir::new()?;
    let docs = dir.path().join("public/docs/eng");
    fs::create_dir_all(&docs)?;
    fs::write(dir.path().join("public/data.json"), DATASET)?;
    fs::write(
        docs.join("maint.md"),
        "# Overview\n\nRoutine work.\n\n## Oil Change\n\nDrain first.\n\n### Torque specs\n",
    )?;
    fs::write(docs.join("hull.md"), "# Hull\n\n## Antifouling\n")?;
    Ok(dir)
}

fn docshelf(dir: &Path) -> Result<assert_cmd::Command> {
    let mut cmd = assert_cmd::Command::cargo_bin("docshelf")?;
    cmd.current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("DOCSHELF_DATASET")
        .env_remove("DOCSHELF_CONTENT_ROOT")
        .env_remove("DOCSHELF_BASE_URL")
        .env("DOCSHELF_CACHE_DIR", dir.join("cache"));
    Ok(cmd)
}

#[test]
fn roles_lists_document_counts() -> Result<()> {
    let dir = fixture()?;
    docshelf(dir.path())?
        .arg("roles")
        .assert()
        .success()
        .stdout(contains("maintenance\tMaintenance\t2 documents"))
        .stdout(contains("crew\tCrew\t2 documents"));
    Ok(())
}

#[test]
fn list_filters_by_role() -> Result<()> {
    let dir = fixture()?;
    let output = docshelf(dir.path())?
        .args(["list", "--role", "crew"])
        .output()?;
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout)?,
        "crew/safety\tSafety\t/docs/crew/safety/\ncrew/todo\tPlaceholder\t/docs/crew/todo/\n"
    );
    Ok(())
}

#[test]
fn search_reports_title_and_heading_matches() -> Result<()> {
    let dir = fixture()?;
    docshelf(dir.path())?
        .args(["search", "oil"])
        .assert()
        .success()
        .stdout(contains("Engine Maintenance\t/docs/eng/maint/ [title]"))
        .stdout(contains("  ## Oil Change\t/docs/eng/maint/#oil-change"))
        .stdout(contains("Hull").not());
    Ok(())
}

#[test]
fn search_json_exposes_the_view() -> Result<()> {
    let dir = fixture()?;
    let output = docshelf(dir.path())?
        .args(["search", "life", "--role", "crew", "--json"])
        .output()?;
    assert!(output.status.success());
    let view: JsonValue = serde_json::from_slice(&output.stdout)?;
    assert_eq!(view["role_id"], "crew");
    assert_eq!(view["query"], "life");
    let results = view["results"].as_array().cloned().unwrap_or_default();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["category"]["slug"], "crew/safety");
    assert_eq!(results[0]["title_match"], false);
    assert_eq!(results[0]["heading_matches"][0]["anchor"], "life-jackets");
    Ok(())
}

#[test]
fn blank_search_prints_the_unfiltered_role() -> Result<()> {
    let dir = fixture()?;
    docshelf(dir.path())?
        .args(["search", "  "])
        .assert()
        .success()
        .stdout(contains("eng/maint\tEngine Maintenance"))
        .stdout(contains("eng/hull\tHull"));
    Ok(())
}

#[test]
fn show_renders_html_with_heading_anchors() -> Result<()> {
    let dir = fixture()?;
    docshelf(dir.path())?
        .args(["show", "eng", "maint", "--html"])
        .assert()
        .success()
        .stdout(contains(r#"<h2 id="oil-change">Oil Change</h2>"#));
    Ok(())
}

#[test]
fn show_prints_inline_content() -> Result<()> {
    let dir = fixture()?;
    docshelf(dir.path())?
        .args(["show", "crew/safety"])
        .assert()
        .success()
        .stdout(contains("## Life jackets"));
    Ok(())
}

#[test]
fn unknown_slug_exits_with_not_found() -> Result<()> {
    let dir = fixture()?;
    docshelf(dir.path())?
        .args(["show", "eng/nope"])
        .assert()
        .code(2)
        .stderr(contains("Not found"));
    Ok(())
}

#[test]
fn document_without_body_is_not_found() -> Result<()> {
    let dir = fixture()?;
    docshelf(dir.path())?
        .args(["show", "crew/todo"])
        .assert()
        .code(2);
    docshelf(dir.path())?
        .args(["list", "--role", "pilot"])
        .assert()
        .code(2);
    Ok(())
}

#[test]
fn toc_lists_three_levels() -> Result<()> {
    let dir = fixture()?;
    let output = docshelf(dir.path())?.args(["toc", "eng/maint"]).output()?;
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout)?,
        "- Overview (#overview)\n  - Oil Change (#oil-change)\n    - Torque specs (#torque-specs)\n"
    );
    Ok(())
}

#[test]
fn routes_follow_dataset_order() -> Result<()> {
    let dir = fixture()?;
    let output = docshelf(dir.path())?.arg("routes").output()?;
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout)?,
        "/docs/eng/maint/\n/docs/eng/hull/\n/docs/crew/safety/\n/docs/crew/todo/\n"
    );
    Ok(())
}

#[test]
fn cache_stats_and_clear() -> Result<()> {
    let dir = fixture()?;
    docshelf(dir.path())?
        .args(["show", "eng/maint"])
        .assert()
        .success();
    docshelf(dir.path())?
        .args(["cache", "stats"])
        .assert()
        .success()
        .stdout(contains("1 of 20 entries"))
        .stdout(contains("docs/eng/maint.md\t"));
    docshelf(dir.path())?
        .args(["cache", "clear"])
        .assert()
        .success()
        .stdout(contains("Removed 1 cached documents"));
    docshelf(dir.path())?
        .args(["cache", "stats"])
        .assert()
        .success()
        .stdout(contains("0 of 20 entries"));
    Ok(())
}

#[test]
fn cache_evict_trims_to_configured_capacity() -> Result<()> {
    let dir = fixture()?;
    for slug in ["eng/maint", "eng/hull"] {
        docshelf(dir.path())?.args(["show", slug]).assert().success();
    }
    fs::write(dir.path().join("docshelf.toml"), "[cache]\ncapacity = 1\n")?;
    docshelf(dir.path())?
        .args(["cache", "stats"])
        .assert()
        .success()
        .stdout(contains("2 of 1 entries"));
    docshelf(dir.path())?
        .args(["cache", "evict"])
        .assert()
        .success()
        .stdout(contains("Evicted 1 cached documents"));
    docshelf(dir.path())?
        .args(["cache", "stats"])
        .assert()
        .success()
        .stdout(contains("1 of 1 entries"))
        .stdout(contains("docs/eng/hull.md\t"))
        .stdout(contains("docs/eng/maint.md").not());
    docshelf(dir.path())?
        .args(["cache", "evict"])
        .assert()
        .success()
        .stdout(contains("Evicted 0 cached documents"));
    Ok(())
}

#[test]
fn cached_body_survives_removed_source() -> Result<()> {
    let dir = fixture()?;
    docshelf(dir.path())?
        .args(["show", "eng/hull"])
        .assert()
        .success();
    fs::remove_file(dir.path().join("public/docs/eng/hull.md"))?;
    docshelf(dir.path())?
        .args(["show", "eng/hull"])
        .assert()
        .success()
        .stdout(contains("## Antifouling"));
    Ok(())
}

#[test]
fn invalid_config_is_rejected() -> Result<()> {
    let dir = fixture()?;
    fs::write(dir.path().join("docshelf.toml"), "[cache]\ncapacity = 0\n")?;
    docshelf(dir.path())?
        .arg("routes")
        .assert()
        .failure()
        .code(1)
        .stderr(contains("cache.capacity"));
    Ok(())
}

#[test]
fn missing_dataset_is_an_error() -> Result<()> {
    let dir = TempDir::new()?;
    docshelf(dir.path())?
        .arg("roles")
        .assert()
        .code(1)
        .stderr(contains("failed to load dataset"));
    Ok(())
}
