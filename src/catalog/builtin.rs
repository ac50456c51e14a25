//! Ready-made email templates.

use super::TemplateManager;
use crate::template::{NewTemplate, Template, TemplateType, TemplateVariable};

/// Brand used when a render supplies no `app_name`.
pub const DEFAULT_APP_NAME: &str = "Acme";

const WELCOME_BODY: &str = "\
Hi {{ user.name }},

Welcome to {{ app_name }}! We're excited to have you on board.

Your account has been created with the email: {{ user.email }}

{% if verification_link %}
Please verify your email by clicking the link below:
{{ verification_link }}
{% endif %}

Best regards,
The {{ app_name }} Team";

const WELCOME_HTML: &str = "\
<!DOCTYPE html>
<html>
<head><style>body{font-family:Arial,sans-serif;}</style></head>
<body>
<h1>Welcome to {{ app_name }}!</h1>
<p>Hi {{ user.name }},</p>
<p>We're excited to have you on board.</p>
{% if verification_link %}
<p><a href=\"{{ verification_link }}\">Verify your email</a></p>
{% endif %}
<p>Best regards,<br>The {{ app_name }} Team</p>
</body>
</html>";

const PASSWORD_RESET_BODY: &str = "\
Hi {{ user.name }},

We received a request to reset your password.

Click the link below to reset your password:
{{ reset_link }}

This link will expire in {{ expiry_hours }} hours.

If you didn't request this, please ignore this email.

Best regards,
The {{ app_name }} Team";

/// Register `email.welcome` (category `onboarding`).
pub fn welcome(manager: &mut TemplateManager) -> Template {
    manager.register(
        NewTemplate::new("email.welcome", "Welcome Email", TemplateType::Email, WELCOME_BODY)
            .subject("Welcome to {{ app_name }}, {{ user.name }}!")
            .html_body(WELCOME_HTML)
            .variable(TemplateVariable::new("user").var_type("object"))
            .variable(TemplateVariable::new("app_name").default_value(DEFAULT_APP_NAME))
            .variable(TemplateVariable::optional("verification_link"))
            .category("onboarding"),
    )
}

/// Register `email.password_reset` (category `auth`).
pub fn password_reset(manager: &mut TemplateManager) -> Template {
    manager.register(
        NewTemplate::new(
            "email.password_reset",
            "Password Reset Email",
            TemplateType::Email,
            PASSWORD_RESET_BODY,
        )
        .subject("Reset your {{ app_name }} password")
        .variable(TemplateVariable::new("user").var_type("object"))
        .variable(TemplateVariable::new("reset_link"))
        .variable(
            TemplateVariable::new("expiry_hours")
                .var_type("number")
                .default_value(24),
        )
        .variable(TemplateVariable::new("app_name").default_value(DEFAULT_APP_NAME))
        .category("auth"),
    )
}

/// Register every built-in template.
pub fn register_all(manager: &mut TemplateManager) -> Vec<Template> {
    vec![welcome(manager), password_reset(manager)]
}
