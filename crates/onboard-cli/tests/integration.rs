#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

const COMPLETE_ANSWERS: &str = r#"
nome: Carlos Lima
dataNascimento: "15/03/1990"
idade: 35
sexo: Masculino
altura: 175
pesoAtual: 70
tipoCorpo: Mesomorfo
aguaDiaria: 2-6 copos
experiencia: Intermediário
objetivo: Hipertrofia
frequenciaSemanal: 3
tempoDisponivel: 60
localTreino: Academia
problemasAnteriores: []
objetivosAdicionais: []
lesoes: []
"#;

fn onboard(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("onboard").unwrap();
    cmd.current_dir(dir.path()).env("ONBOARD_ROOT", dir.path());
    cmd
}

fn init_project(dir: &TempDir) {
    onboard(dir).arg("init").assert().success();
}

fn write_answers(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, body).unwrap();
    path
}

fn json_output(cmd: &mut Command) -> serde_json::Value {
    let out = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).unwrap()
}

// ---------------------------------------------------------------------------
// onboard init / config
// ---------------------------------------------------------------------------

#[test]
fn init_creates_config_and_gitignore_entry() {
    let dir = TempDir::new().unwrap();
    onboard(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("created: .onboard/config.yaml"));

    assert!(dir.path().join(".onboard/config.yaml").exists());
    let gitignore = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
    assert!(gitignore.contains(".onboard/handoff.redb"));
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    onboard(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("exists:  .onboard/config.yaml"));

    let gitignore = std::fs::read_to_string(dir.path().join(".gitignore")).unwrap();
    assert_eq!(gitignore.matches(".onboard/handoff.redb").count(), 1);
}

#[test]
fn commands_fail_before_init() {
    let dir = TempDir::new().unwrap();
    let file = write_answers(&dir, "answers.yaml", COMPLETE_ANSWERS);
    onboard(&dir)
        .arg("estimate")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("run 'onboard init'"));
}

#[test]
fn config_validate_accepts_defaults() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    onboard(&dir).args(["config", "validate"]).assert().success();
}

#[test]
fn config_validate_rejects_non_http_signup_url() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let path = dir.path().join(".onboard/config.yaml");
    let cfg = std::fs::read_to_string(&path).unwrap();
    std::fs::write(
        &path,
        cfg.replace("http://localhost:3001/api", "ftp://localhost/api"),
    )
    .unwrap();

    onboard(&dir).args(["config", "validate"]).assert().failure();
}

// ---------------------------------------------------------------------------
// onboard steps
// ---------------------------------------------------------------------------

#[test]
fn steps_lists_the_whole_flow() {
    let dir = TempDir::new().unwrap();
    let v = json_output(onboard(&dir).args(["steps", "--json"]));
    assert_eq!(v["total_steps"], 18);
    let steps = v["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 19);
    assert_eq!(steps[0]["id"], "landing");
    assert_eq!(steps[18]["id"], "birth_date");
}

#[test]
fn steps_table_shows_legacy_labels() {
    let dir = TempDir::new().unwrap();
    onboard(&dir)
        .arg("steps")
        .assert()
        .success()
        .stdout(predicate::str::contains("water_feedback"))
        .stdout(predicate::str::contains("5.5"));
}

// ---------------------------------------------------------------------------
// onboard walk
// ---------------------------------------------------------------------------

#[test]
fn walk_reaches_the_last_step() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let file = write_answers(&dir, "answers.yaml", COMPLETE_ANSWERS);

    let v = json_output(onboard(&dir).arg("walk").arg(&file).arg("--json"));
    let transitions = v["transitions"].as_array().unwrap();
    assert_eq!(transitions.len(), 18);
    assert_eq!(transitions.last().unwrap()["step"], "birth_date");
    assert_eq!(transitions.last().unwrap()["progress"], 100.0);
    assert_eq!(v["finalized"], false);
    assert!(v["blocker"].is_null());

    let water = transitions
        .iter()
        .find(|t| t["step"] == "water_feedback")
        .unwrap();
    assert!(water["feedback"]["title"].is_string());
}

#[test]
fn walk_stops_at_missing_height() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let partial = COMPLETE_ANSWERS.replace("altura: 175\n", "");
    let file = write_answers(&dir, "partial.yaml", &partial);

    onboard(&dir)
        .arg("walk")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("walk stopped at step height"))
        .stderr(predicate::str::contains("Informe sua altura"));
}

#[test]
fn walk_rejects_body_type_for_other_sex() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let bad = COMPLETE_ANSWERS.replace("sexo: Masculino", "sexo: Feminino");
    let file = write_answers(&dir, "bad.yaml", &bad);

    onboard(&dir)
        .arg("walk")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not offered"));
}

#[test]
fn walk_finalize_fills_the_handoff_slot() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let file = write_answers(&dir, "answers.yaml", COMPLETE_ANSWERS);

    onboard(&dir)
        .arg("walk")
        .arg(&file)
        .arg("--finalize")
        .assert()
        .success()
        .stdout(predicate::str::contains("answers saved for signup"));

    let v = json_output(onboard(&dir).args(["handoff", "show", "--json"]));
    assert_eq!(v["record"]["data"]["nome"], "Carlos Lima");
    assert_eq!(v["record"]["data"]["dataNascimento"], "15/03/1990");
    assert_eq!(v["record"]["data"]["tempoDisponivel"], 60);
}

// ---------------------------------------------------------------------------
// onboard estimate / report
// ---------------------------------------------------------------------------

#[test]
fn estimate_prints_calories_and_water() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let file = write_answers(&dir, "answers.yaml", COMPLETE_ANSWERS);

    onboard(&dir)
        .arg("estimate")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("2233 kcal"))
        .stdout(predicate::str::contains("2.5 L"));
}

#[test]
fn estimate_json_reports_bmi_class() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let file = write_answers(&dir, "answers.yaml", COMPLETE_ANSWERS);

    let v = json_output(onboard(&dir).arg("estimate").arg(&file).arg("--json"));
    assert_eq!(v["metrics"]["dailyCalories"], 2233);
    assert_eq!(v["metrics"]["bmi"]["class"], "Peso normal");
}

#[test]
fn estimate_rejects_out_of_range_height() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let bad = COMPLETE_ANSWERS.replace("altura: 175", "altura: 5000");
    let file = write_answers(&dir, "bad.yaml", &bad);

    onboard(&dir)
        .arg("estimate")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value for altura"));
}

#[test]
fn estimate_rejects_age_outside_the_bands() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let bad = COMPLETE_ANSWERS.replace("idade: 35", "idade: 30");
    let file = write_answers(&dir, "bad.yaml", &bad);

    onboard(&dir)
        .arg("estimate")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value for idade"));
}

#[test]
fn walk_then_report_matches_estimate() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let file = write_answers(&dir, "answers.yaml", COMPLETE_ANSWERS);
    onboard(&dir)
        .arg("walk")
        .arg(&file)
        .arg("--finalize")
        .assert()
        .success();

    let v = json_output(onboard(&dir).args(["report", "--json"]));
    assert_eq!(v["metrics"]["dailyCalories"], 2233);
}

#[test]
fn report_without_record_fails() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    onboard(&dir)
        .arg("report")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no onboarding record"));
}

#[test]
fn report_reads_the_handoff_record() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let file = write_answers(&dir, "answers.yaml", COMPLETE_ANSWERS);
    onboard(&dir)
        .arg("walk")
        .arg(&file)
        .arg("--finalize")
        .assert()
        .success();

    onboard(&dir)
        .arg("report")
        .assert()
        .success()
        .stdout(predicate::str::contains("Carlos Lima (15/03/1990)"))
        .stdout(predicate::str::contains("3x por semana"))
        .stdout(predicate::str::contains("60 minutos"));
}

#[test]
fn report_flags_inconsistent_body_type() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let odd = COMPLETE_ANSWERS.replace("tipoCorpo: Mesomorfo", "tipoCorpo: Obesidade");
    let file = write_answers(&dir, "odd.yaml", &odd);

    onboard(&dir)
        .arg("report")
        .arg("--file")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Nota: O IMC calculado"));
}

// ---------------------------------------------------------------------------
// onboard handoff
// ---------------------------------------------------------------------------

#[test]
fn handoff_clear_empties_the_slot() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let file = write_answers(&dir, "answers.yaml", COMPLETE_ANSWERS);
    onboard(&dir)
        .arg("walk")
        .arg(&file)
        .arg("--finalize")
        .assert()
        .success();

    onboard(&dir)
        .args(["handoff", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared"));
    onboard(&dir)
        .args(["handoff", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No pending onboarding record"));
}

#[test]
fn handoff_submit_checks_the_form_first() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    onboard(&dir)
        .args([
            "handoff",
            "submit",
            "--nome",
            "Carlos Lima",
            "--telefone",
            "(11) 98765-4321",
            "--email",
            "carlos@example.com",
            "--senha",
            "segredo1",
            "--confirmar-senha",
            "outra123",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("As senhas não coincidem"));
}

#[test]
fn handoff_submit_keeps_record_when_server_unreachable() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let path = dir.path().join(".onboard/config.yaml");
    let cfg = std::fs::read_to_string(&path).unwrap();
    std::fs::write(
        &path,
        cfg.replace("http://localhost:3001/api", "http://127.0.0.1:1/api"),
    )
    .unwrap();

    let file = write_answers(&dir, "answers.yaml", COMPLETE_ANSWERS);
    onboard(&dir)
        .arg("walk")
        .arg(&file)
        .arg("--finalize")
        .assert()
        .success();

    onboard(&dir)
        .args([
            "handoff",
            "submit",
            "--nome",
            "Carlos Lima",
            "--telefone",
            "(11) 98765-4321",
            "--email",
            "carlos@example.com",
        ])
        .env("ONBOARD_SENHA", "segredo1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Erro de conexão"));

    let v = json_output(onboard(&dir).args(["handoff", "show", "--json"]));
    assert_eq!(v["record"]["data"]["nome"], "Carlos Lima");
}
