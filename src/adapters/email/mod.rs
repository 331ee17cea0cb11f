//! Email adapter implementations (Resend).

mod resend_mailer;

pub use resend_mailer::ResendMailer;
