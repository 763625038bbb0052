use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::models::{Claims, Principal};
use crate::auth::repository;
use crate::error::AppError;
use crate::AppState;

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    bcrypt::verify(password, hash)
}

pub fn create_jwt(
    user_id: &str,
    username: &str,
    secret: &str,
    expiry_hours: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let expiration = chrono::TimeDelta::try_hours(expiry_hours)
        .and_then(|ttl| chrono::Utc::now().checked_add_signed(ttl))
        .ok_or_else(|| jsonwebtoken::errors::Error::from(ErrorKind::ExpiredSignature))?
        .timestamp() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn decode_jwt(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

pub fn ensure_active(principal: &impl Principal) -> Result<(), AppError> {
    if principal.is_active() {
        Ok(())
    } else {
        tracing::warn!(user_id = %principal.id(), "Request refused - account disabled");
        Err(AppError::Forbidden("Account is disabled".into()))
    }
}

pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".into()))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid authorization header".into()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization header format".into()))?;

    let claims = decode_jwt(token, &state.config.jwt_secret)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

    // tokens outlive account changes
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;
    let user = repository::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".into()))?;
    ensure_active(&user)?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing_and_verification() {
        let password = "my_secure_password";
        let hash = hash_password(password).expect("hashing failed");

        assert_ne!(password, hash);
        assert!(verify_password(password, &hash).expect("verification failed"));
        assert!(!verify_password("wrong_password", &hash).expect("verification failed"));
    }

    #[test]
    fn test_jwt_creation_and_decoding() {
        let secret = "super_secret_key";
        let user_id = "123-456";

        let token = create_jwt(user_id, "diarist", secret, 1).expect("creation failed");
        let claims = decode_jwt(&token, secret).expect("decoding failed");

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.username, "diarist");
    }

    #[test]
    fn test_jwt_rejects_foreign_secret() {
        let token = create_jwt("123", "diarist", "secret_a", 1).unwrap();
        assert!(decode_jwt(&token, "secret_b").is_err());
    }

    #[test]
    fn test_jwt_expiration_validation() {
        let secret = "super_secret_key";
        let claims = Claims {
            sub: "123".to_string(),
            username: "test".to_string(),
            exp: (chrono::Utc::now().timestamp() - 3600) as usize, // 1 hour ago
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        let result = decode_jwt(&token, secret);
        assert!(result.is_err());
    }

    struct Account(bool);

    impl Principal for Account {
        fn id(&self) -> Uuid {
            Uuid::nil()
        }

        fn is_active(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn test_disabled_principal_is_forbidden() {
        assert!(ensure_active(&Account(true)).is_ok());
        assert!(matches!(
            ensure_active(&Account(false)),
            Err(AppError::Forbidden(msg)) if msg == "Account is disabled"
        ));
    }
}
