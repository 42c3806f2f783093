//! Account creation with the finished onboarding record.
//!
//! The signup step reads the record from the hand-off slot, posts it with
//! the user's credentials to `{base_url}/auth/cadastro-pre-pagamento`, and
//! clears the slot only once the server answers with a complete session.
//! Any failure leaves the record in place so the user can retry.

use crate::answers::OnboardingAnswers;
use crate::config::SignupConfig;
use crate::error::{OnboardError, Result};
use crate::store::{HandoffRecord, HandoffStore};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{info, warn};

pub const SIGNUP_PATH: &str = "/auth/cadastro-pre-pagamento";

const MIN_PHONE_DIGITS: usize = 10;
const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_re() -> &'static Regex {
    EMAIL_RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

// ---------------------------------------------------------------------------
// SignupForm
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupForm {
    pub nome_completo: String,
    pub telefone: String,
    pub email: String,
    pub senha: String,
    pub confirmar_senha: String,
}

impl SignupForm {
    /// Check the form field by field, reporting the first problem.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| Err(OnboardError::InvalidForm(msg.to_string()));

        if self.nome_completo.trim().is_empty() {
            return fail("Nome completo é obrigatório");
        }
        if self.email.trim().is_empty() {
            return fail("E-mail é obrigatório");
        }
        if !email_re().is_match(&self.email) {
            return fail("E-mail inválido");
        }
        let phone_digits = self.telefone.chars().filter(char::is_ascii_digit).count();
        if phone_digits < MIN_PHONE_DIGITS {
            return fail("Telefone inválido");
        }
        if self.senha.chars().count() < MIN_PASSWORD_LEN {
            return fail("Senha deve ter no mínimo 6 caracteres");
        }
        if self.senha != self.confirmar_senha {
            return fail("As senhas não coincidem");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct SignupRequest<'a> {
    pub nome: &'a str,
    pub telefone: &'a str,
    pub email: &'a str,
    pub senha: &'a str,
    pub onboarding: &'a OnboardingAnswers,
}

impl<'a> SignupRequest<'a> {
    pub fn new(form: &'a SignupForm, onboarding: &'a OnboardingAnswers) -> Self {
        Self {
            nome: &form.nome_completo,
            telefone: &form.telefone,
            email: &form.email,
            senha: &form.senha,
            onboarding,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: serde_json::Value,
}

/// Response body as the server may send it; any field can be missing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    user: Option<serde_json::Value>,
    error: Option<String>,
    message: Option<String>,
}

/// Map an unsuccessful status and its body to the message shown to the user.
fn rejection_message(status: u16, error: Option<&str>, message: Option<&str>) -> String {
    if status == 400 {
        return error
            .unwrap_or("Dados inválidos. Verifique as informações e tente novamente.")
            .to_string();
    }
    if status == 409 || error.is_some_and(|e| e.contains("já cadastrado")) {
        return "Este e-mail já está cadastrado. Tente fazer login ou use outro e-mail.".to_string();
    }
    if status >= 500 {
        return "Erro no servidor. Tente novamente em alguns instantes.".to_string();
    }
    error
        .or(message)
        .unwrap_or("Erro ao realizar cadastro")
        .to_string()
}

const CONNECTION_ERROR: &str = "Erro de conexão. Verifique sua internet e tente novamente.";

// ---------------------------------------------------------------------------
// SignupClient
// ---------------------------------------------------------------------------

pub trait SignupClient {
    fn register(&self, request: &SignupRequest<'_>) -> Result<SignupResponse>;
}

pub struct HttpSignupClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpSignupClient {
    pub fn new(config: &SignupConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OnboardError::SignupTransport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, SIGNUP_PATH)
    }
}

impl SignupClient for HttpSignupClient {
    fn register(&self, request: &SignupRequest<'_>) -> Result<SignupResponse> {
        let url = self.endpoint();
        let res = self.client.post(&url).json(request).send().map_err(|e| {
            warn!(url = %url, error = %e, "signup request failed");
            OnboardError::SignupTransport(CONNECTION_ERROR.to_string())
        })?;

        let status = res.status();
        let body: RawResponse = res.json().unwrap_or_default();

        if !status.is_success() {
            let msg = rejection_message(
                status.as_u16(),
                body.error.as_deref(),
                body.message.as_deref(),
            );
            warn!(status = status.as_u16(), reason = %msg, "signup rejected");
            return Err(OnboardError::SignupRejected(msg));
        }

        match (body.access_token, body.refresh_token, body.user) {
            (Some(access_token), Some(refresh_token), Some(user))
                if !access_token.is_empty() && !refresh_token.is_empty() =>
            {
                Ok(SignupResponse {
                    access_token,
                    refresh_token,
                    user,
                })
            }
            _ => {
                warn!(status = status.as_u16(), "signup response missing session fields");
                Err(OnboardError::SignupRejected(
                    "Dados incompletos na resposta do servidor".to_string(),
                ))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Handoff
// ---------------------------------------------------------------------------

/// Binds the durable slot to a signup client.
pub struct Handoff<'a> {
    slot: &'a dyn HandoffStore,
    client: &'a dyn SignupClient,
}

impl<'a> Handoff<'a> {
    pub fn new(slot: &'a dyn HandoffStore, client: &'a dyn SignupClient) -> Self {
        Self { slot, client }
    }

    /// The waiting record. Without one, the user has to start onboarding.
    pub fn pending(&self) -> Result<HandoffRecord> {
        self.slot.load()?.ok_or(OnboardError::NoHandoffRecord)
    }

    /// Validate the form, register, and clear the slot on success.
    pub fn submit(&self, form: &SignupForm) -> Result<SignupResponse> {
        form.validate()?;
        let record = self.pending()?;
        let response = self
            .client
            .register(&SignupRequest::new(form, &record.data))?;
        // The account exists now; a leftover record must not turn that into
        // a failure, or a retry would hit the duplicate-email rejection.
        match self.slot.clear() {
            Ok(_) => info!(session = %record.session, "onboarding record consumed by signup"),
            Err(e) => warn!(
                session = %record.session,
                error = %e,
                "signup succeeded but the onboarding record could not be cleared"
            ),
        }
        Ok(response)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryHandoffStore;
    use crate::types::Sex;
    use mockito::Matcher;
    use serde_json::json;
    use uuid::Uuid;

    fn form() -> SignupForm {
        SignupForm {
            nome_completo: "Ana Souza".to_string(),
            telefone: "(11) 98765-4321".to_string(),
            email: "ana@example.com".to_string(),
            senha: "segredo1".to_string(),
            confirmar_senha: "segredo1".to_string(),
        }
    }

    fn slot_with_record() -> MemoryHandoffStore {
        let mut answers = OnboardingAnswers::new();
        answers.set_sex(Sex::Feminino);
        answers.set_frequency(3).unwrap();
        let slot = MemoryHandoffStore::new();
        slot.save(&HandoffRecord::new(Uuid::new_v4(), answers)).unwrap();
        slot
    }

    fn client_for(server: &mockito::Server) -> HttpSignupClient {
        HttpSignupClient::new(&SignupConfig {
            base_url: server.url(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn form_error(f: &SignupForm) -> String {
        match f.validate() {
            Err(OnboardError::InvalidForm(msg)) => msg,
            other => panic!("expected form error, got {other:?}"),
        }
    }

    #[test]
    fn form_validation_messages() {
        assert!(form().validate().is_ok());

        let mut f = form();
        f.nome_completo = "   ".to_string();
        assert_eq!(form_error(&f), "Nome completo é obrigatório");

        let mut f = form();
        f.email = "ana@example".to_string();
        assert_eq!(form_error(&f), "E-mail inválido");

        let mut f = form();
        f.telefone = "98765-432".to_string();
        assert_eq!(form_error(&f), "Telefone inválido");

        let mut f = form();
        f.senha = "abc".to_string();
        f.confirmar_senha = "abc".to_string();
        assert_eq!(form_error(&f), "Senha deve ter no mínimo 6 caracteres");

        let mut f = form();
        f.confirmar_senha = "outra123".to_string();
        assert_eq!(form_error(&f), "As senhas não coincidem");
    }

    #[test]
    fn rejection_mapping() {
        assert_eq!(rejection_message(400, Some("CPF inválido"), None), "CPF inválido");
        assert!(rejection_message(400, None, None).starts_with("Dados inválidos"));
        assert!(rejection_message(409, None, None).starts_with("Este e-mail já está cadastrado"));
        assert!(
            rejection_message(422, Some("Usuário já cadastrado"), None)
                .starts_with("Este e-mail já está cadastrado")
        );
        assert!(rejection_message(503, None, None).starts_with("Erro no servidor"));
        assert_eq!(rejection_message(403, None, Some("Proibido")), "Proibido");
        assert_eq!(rejection_message(404, None, None), "Erro ao realizar cadastro");
    }

    #[test]
    fn successful_submit_clears_slot() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", SIGNUP_PATH)
            .match_body(Matcher::PartialJson(json!({
                "nome": "Ana Souza",
                "email": "ana@example.com",
                "onboarding": { "sexo": "Feminino", "frequenciaSemanal": 3 }
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"accessToken":"a","refreshToken":"r","user":{"id":"u1"}}"#)
            .create();

        let slot = slot_with_record();
        let client = client_for(&server);
        let response = Handoff::new(&slot, &client).submit(&form()).unwrap();

        mock.assert();
        assert_eq!(response.access_token, "a");
        assert_eq!(response.user["id"], "u1");
        assert_eq!(slot.load().unwrap(), None);
    }

    /// Slot that holds a record but refuses to clear it.
    struct StuckSlot(MemoryHandoffStore);

    impl HandoffStore for StuckSlot {
        fn save(&self, record: &HandoffRecord) -> Result<()> {
            self.0.save(record)
        }
        fn load(&self) -> Result<Option<HandoffRecord>> {
            self.0.load()
        }
        fn clear(&self) -> Result<bool> {
            Err(OnboardError::Store("database is locked".to_string()))
        }
    }

    struct AcceptingClient;

    impl SignupClient for AcceptingClient {
        fn register(&self, _: &SignupRequest<'_>) -> Result<SignupResponse> {
            Ok(SignupResponse {
                access_token: "a".to_string(),
                refresh_token: "r".to_string(),
                user: json!({ "id": "u1" }),
            })
        }
    }

    #[test]
    fn failed_clear_after_signup_still_succeeds() {
        let slot = StuckSlot(slot_with_record());
        let response = Handoff::new(&slot, &AcceptingClient)
            .submit(&form())
            .unwrap();
        assert_eq!(response.access_token, "a");
        assert!(slot.load().unwrap().is_some());
    }

    #[test]
    fn conflict_keeps_record() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", SIGNUP_PATH)
            .with_status(409)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"duplicado"}"#)
            .create();

        let slot = slot_with_record();
        let client = client_for(&server);
        let err = Handoff::new(&slot, &client).submit(&form()).unwrap_err();
        match err {
            OnboardError::SignupRejected(msg) => assert!(msg.contains("já está cadastrado")),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(slot.load().unwrap().is_some());
    }

    #[test]
    fn incomplete_session_is_a_failure() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", SIGNUP_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"accessToken":"a"}"#)
            .create();

        let slot = slot_with_record();
        let client = client_for(&server);
        assert!(matches!(
            Handoff::new(&slot, &client).submit(&form()),
            Err(OnboardError::SignupRejected(_))
        ));
        assert!(slot.load().unwrap().is_some());
    }

    #[test]
    fn unreachable_server_is_transport_error() {
        let client = HttpSignupClient::new(&SignupConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
        })
        .unwrap();
        let slot = slot_with_record();
        match Handoff::new(&slot, &client).submit(&form()) {
            Err(OnboardError::SignupTransport(msg)) => assert_eq!(msg, CONNECTION_ERROR),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(slot.load().unwrap().is_some());
    }

    #[test]
    fn submit_without_record() {
        let slot = MemoryHandoffStore::new();
        let server = mockito::Server::new();
        let client = client_for(&server);
        assert!(matches!(
            Handoff::new(&slot, &client).submit(&form()),
            Err(OnboardError::NoHandoffRecord)
        ));
    }

    #[test]
    fn endpoint_joins_base_url() {
        let client = HttpSignupClient::new(&SignupConfig {
            base_url: "https://api.example.com/api/".to_string(),
            timeout_secs: 15,
        })
        .unwrap();
        assert_eq!(
            client.endpoint(),
            "https://api.example.com/api/auth/cadastro-pre-pagamento"
        );
    }
}
