// Users, admins and the admin auth flow.

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tripdesk_api::FormPayload;

use super::NormalizeError;
use super::fields::Fields;
use crate::model::{Acknowledgement, Admin, LoginOutcome, User};
use crate::requests::{
    AdminInput, ForgotPasswordRequest, LoginRequest, OtpVerification, PasswordReset, UserInput,
};

pub fn user(value: &Value) -> Result<User, NormalizeError> {
    let f = Fields::of(value, "user")?;
    Ok(User {
        id: f.id(),
        name: f.string_or("name", "Unknown"),
        lastname: f.string_or("lastname", "User"),
        email: f.text("email"),
        profile_image: f.string("profileImage"),
        travel_preferences: f.strings("travelPreferences"),
        points: f.count("points"),
        created_at: f.datetime("createdAt"),
        updated_at: f.datetime("updatedAt"),
    })
}

pub fn user_form(input: &UserInput) -> FormPayload {
    let mut form = FormPayload::new()
        .text("name", input.name.trim())
        .text("lastname", input.lastname.trim())
        .text("email", input.email.trim())
        .text_opt(
            "password",
            input.password.as_ref().map(|p| p.expose_secret().to_owned()),
        );
    for preference in &input.travel_preferences {
        form = form.text("travelPreferences", preference.as_str());
    }
    form.file_opt("profileImage", input.profile_image.clone())
}

pub fn admin(value: &Value) -> Result<Admin, NormalizeError> {
    let f = Fields::of(value, "admin")?;
    Ok(Admin {
        id: f.id(),
        name: f.text("name"),
        email: f.text("email"),
        image: f.first_string(&["profileImage", "image"]),
        role: f.string("role"),
        department: f.string("department"),
        location: f.string("location"),
        join_date: f.datetime("joinDate").or_else(|| f.datetime("createdAt")),
        last_active: f.datetime("lastActive"),
    })
}

pub fn admin_form(input: &AdminInput) -> FormPayload {
    FormPayload::new()
        .text("name", input.name.trim())
        .text("email", input.email.trim())
        .text_opt(
            "password",
            input.password.as_ref().map(|p| p.expose_secret().to_owned()),
        )
        .file_opt("image", input.image.clone())
}

pub fn login_body(request: &LoginRequest) -> Value {
    json!({
        "email": request.email.trim(),
        "password": request.password.expose_secret(),
    })
}

/// Login response: `{ success, message, token, admin }`.
pub fn login_outcome(value: &Value) -> Result<LoginOutcome, NormalizeError> {
    let f = Fields::of(value, "login response")?;
    Ok(LoginOutcome {
        message: f.text("message"),
        admin: f.get("admin").and_then(|a| admin(a).ok()),
    })
}

/// Bearer token of a login response, kept apart from [`LoginOutcome`] so
/// it never lands in the query cache or in serialized output.
pub fn login_token(value: &Value) -> Option<SecretString> {
    Fields::of(value, "login response")
        .ok()?
        .string("token")
        .map(SecretString::from)
}

pub fn acknowledgement(value: &Value) -> Result<Acknowledgement, NormalizeError> {
    let f = Fields::of(value, "acknowledgement")?;
    Ok(Acknowledgement {
        success: f.bool_or("success", true),
        message: f.text("message"),
    })
}

pub fn forgot_password_body(request: &ForgotPasswordRequest) -> Value {
    json!({ "email": request.email.trim() })
}

pub fn otp_body(request: &OtpVerification) -> Value {
    json!({ "email": request.email.trim(), "otp": request.otp.trim() })
}

pub fn reset_password_body(request: &PasswordReset) -> Value {
    json!({
        "email": request.email.trim(),
        "otp": request.otp.trim(),
        "newPassword": request.new_password.expose_secret(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn user_defaults() {
        let u = user(&json!({ "id": 42, "name": "" })).unwrap();
        assert_eq!(u.id.as_str(), "42");
        assert_eq!(u.full_name(), "Unknown User");
        assert!(u.travel_preferences.is_empty());
        assert_eq!(u.profile_image, None);
    }

    #[test]
    fn admin_image_aliases() {
        let a = admin(&json!({ "_id": "a1", "name": "Root", "profileImage": "p.png" })).unwrap();
        assert_eq!(a.image.as_deref(), Some("p.png"));
        let a = admin(&json!({ "image": "i.png" })).unwrap();
        assert_eq!(a.image.as_deref(), Some("i.png"));
    }

    #[test]
    fn login_response_parts() {
        let body = json!({
            "success": true,
            "message": "Login successful",
            "token": "eyJhbGciOi",
            "admin": { "id": "a1", "name": "Root", "email": "root@tripdesk.io", "profileImage": null },
        });
        let outcome = login_outcome(&body).unwrap();
        assert_eq!(outcome.message, "Login successful");
        assert_eq!(outcome.admin.unwrap().email, "root@tripdesk.io");
        assert_eq!(login_token(&body).unwrap().expose_secret(), "eyJhbGciOi");
        assert!(login_token(&json!({ "success": true })).is_none());
    }

    #[test]
    fn user_form_repeats_preferences() {
        let form = user_form(&UserInput {
            name: "Ines".into(),
            lastname: "Gharbi".into(),
            email: "ines@example.com".into(),
            travel_preferences: vec!["beach".into(), "culture".into()],
            ..UserInput::default()
        });
        let prefs: Vec<&str> = form
            .fields()
            .iter()
            .filter(|(k, _)| k == "travelPreferences")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(prefs, vec!["beach", "culture"]);
        assert_eq!(form.get("password"), None);
    }

    #[test]
    fn reset_body_uses_backend_names() {
        let body = reset_password_body(&PasswordReset {
            email: "root@tripdesk.io".into(),
            otp: "123456".into(),
            new_password: SecretString::from("s3cret!"),
        });
        assert_eq!(body["newPassword"], json!("s3cret!"));
    }
}
