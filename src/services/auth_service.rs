use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::auth::{Claims, LoginRequest, LoginResponse, RegisterRequest},
    entity::{
        categories::ActiveModel as CategoryActive,
        restaurants::{ActiveModel as RestaurantActive, Model as RestaurantModel},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::jwt_secret,
    models::{ROLE_CUSTOMER, ROLE_RESTAURANT, User},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Categories every new restaurant starts with.
pub const DEFAULT_CATEGORIES: [&str; 5] = ["Pizza", "Pasta", "Salads", "Beverages", "Desserts"];

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    let RegisterRequest {
        name,
        email,
        phone,
        address,
        password,
        role,
    } = payload;

    let role = normalize_role(role.as_deref())?;
    let email = email.trim().to_lowercase();
    for (field, value) in [
        ("name", &name),
        ("email", &email),
        ("phone", &phone),
        ("address", &address),
        ("password", &password),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::BadRequest(format!("{field} is required")));
        }
    }

    let exist = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest("Email is already taken".to_string()));
    }

    let password_hash = hash_password(&password)?;

    let txn = state.orm.begin().await?;
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        email: Set(email),
        phone: Set(phone),
        address: Set(address),
        password_hash: Set(password_hash),
        role: Set(role.to_string()),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    if role == ROLE_RESTAURANT {
        let restaurant = create_restaurant_profile(&txn, &user).await?;
        tracing::info!(
            user_id = %user.id,
            restaurant_id = %restaurant.id,
            "restaurant profile created"
        );
    }
    txn.commit().await?;

    tracing::info!(user_id = %user.id, role = %user.role, "user registered");
    Ok(ApiResponse::success(
        "Registration successful",
        User::from(user),
        None,
    ))
}

/// One restaurant per owner, seeded with [`DEFAULT_CATEGORIES`].
async fn create_restaurant_profile<C: ConnectionTrait>(
    conn: &C,
    owner: &crate::entity::users::Model,
) -> AppResult<RestaurantModel> {
    let restaurant = RestaurantActive {
        id: Set(Uuid::new_v4()),
        name: Set(format!("{}'s Restaurant", owner.name)),
        contact: Set(owner.phone.clone()),
        location: Set(owner.address.clone()),
        user_id: Set(owner.id),
        created_at: NotSet,
    }
    .insert(conn)
    .await?;

    for name in DEFAULT_CATEGORIES {
        CategoryActive {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            restaurant_id: Set(restaurant.id),
        }
        .insert(conn)
        .await?;
    }

    Ok(restaurant)
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let user = Users::find()
        .filter(UserCol::Email.eq(email.trim().to_lowercase()))
        .one(&state.orm)
        .await?;

    let user = match user {
        Some(u) => u,
        None => return Err(AppError::BadRequest("Invalid email or password".into())),
    };

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::BadRequest("Invalid email or password".into()));
    }

    let secret = jwt_secret()?;
    let token = issue_token(&secret, user.id, &user.role, Uuid::new_v4())?;

    tracing::info!(user_id = %user.id, "user logged in");
    Ok(ApiResponse::success(
        "Login successful",
        LoginResponse {
            token: format!("Bearer {}", token),
            role: user.role,
        },
        Some(Meta::empty()),
    ))
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub fn issue_token(secret: &str, user_id: Uuid, role: &str, session_id: Uuid) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        role: role.to_string(),
        sid: session_id.to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

/// Admins are never self-registered.
fn normalize_role(role: Option<&str>) -> AppResult<&'static str> {
    match role.map(|r| r.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some(ROLE_CUSTOMER) => Ok(ROLE_CUSTOMER),
        Some(ROLE_RESTAURANT) => Ok(ROLE_RESTAURANT),
        Some(other) => Err(AppError::BadRequest(format!("Unsupported role {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{DecodingKey, Validation, decode};

    #[test]
    fn roles_default_to_customer() {
        assert_eq!(normalize_role(None).unwrap(), ROLE_CUSTOMER);
        assert_eq!(normalize_role(Some("Restaurant")).unwrap(), ROLE_RESTAURANT);
        assert!(normalize_role(Some("admin")).is_err());
    }

    #[test]
    fn token_carries_session() {
        let user_id = Uuid::new_v4();
        let sid = Uuid::new_v4();
        let token = issue_token("test-secret", user_id, ROLE_CUSTOMER, sid).unwrap();
        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(decoded.claims.sub, user_id.to_string());
        assert_eq!(decoded.claims.sid, sid.to_string());
        assert_eq!(decoded.claims.role, ROLE_CUSTOMER);
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("owner123").unwrap();
        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(Argon2::default().verify_password(b"owner123", &parsed).is_ok());
        assert!(Argon2::default().verify_password(b"wrong", &parsed).is_err());
    }
}
