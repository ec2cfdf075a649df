// src/services/mailer.rs

use std::fmt;

use async_trait::async_trait;

use crate::common::error::AppError;

#[derive(Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

// O corpo carrega o link de redefinição: nunca vai para logs nem `{:?}`
impl fmt::Debug for OutgoingMail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutgoingMail")
            .field("to", &self.to)
            .field("subject", &self.subject)
            .field("body_len", &self.body.len())
            .finish()
    }
}

/// Envio de e-mails transacionais (hoje só o de redefinição de senha).
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), AppError>;
}

/// Não envia nada: registra destinatário e assunto no log. Usado enquanto não há
/// provedor SMTP configurado. O corpo fica de fora porque contém o token.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), AppError> {
        tracing::info!(to = %mail.to, subject = %mail.subject, body_len = mail.body.len(), "📧 E-mail (log)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    fn reset_mail() -> OutgoingMail {
        OutgoingMail {
            to: "ana@loja.com".into(),
            subject: "Redefinição de senha".into(),
            body: "Acesse https://loja.com/reset-password?token=segredo-abc123".into(),
        }
    }

    #[test]
    fn debug_output_hides_the_body() {
        let rendered = format!("{:?}", reset_mail());
        assert!(rendered.contains("ana@loja.com"));
        assert!(!rendered.contains("segredo-abc123"));
        assert!(!rendered.contains("reset-password"));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn log_line_never_carries_the_reset_token() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        LogMailer.send(reset_mail()).await.unwrap();

        let logged = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("ana@loja.com"));
        assert!(!logged.contains("segredo-abc123"));
        assert!(!logged.contains("token="));
    }
}
