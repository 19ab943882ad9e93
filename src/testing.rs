//! Test doubles and request helpers shared by the unit tests.
//!
//! The in-memory stores implement the same traits as the Postgres repos so
//! the whole router can be driven without a database.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use crate::config::Config;
use crate::repos::{
    error::{RepoError, RepoResult},
    owner::OwnerLookup,
    robot_repo::{NewRobot, RobotChanges, RobotRow, RobotStore},
    user_repo::{NewUser, UserChanges, UserRow, UserStore},
};
use crate::services::auth::{
    JwtVerifier, TokenIssuer, TokenVerifier,
    access_jwt::{AccessJwtError, VerifiedAccessToken},
};
use crate::services::password;
use crate::state::AppState;

pub const SECRET: &str = "test-secret-test-secret-test-secret";
pub const ISSUER: &str = "robots-api";

pub fn issuer() -> TokenIssuer {
    TokenIssuer::new(SECRET, ISSUER.to_string(), ISSUER.to_string(), 300)
}

pub fn jwt_verifier() -> JwtVerifier {
    JwtVerifier::new(SECRET, ISSUER, ISSUER, 0)
}

pub fn token_for(user_id: Uuid) -> String {
    issuer()
        .issue_access_token(user_id, "tester")
        .expect("sign test token")
        .token
}

fn sign(user_id: Uuid, exp: i64, secret: &str) -> String {
    let claims = json!({
        "iss": ISSUER,
        "aud": ISSUER,
        "sub": user_id.to_string(),
        "exp": exp,
    });
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("sign test token")
}

pub fn expired_token_for(user_id: Uuid) -> String {
    sign(user_id, Utc::now().timestamp() - 600, SECRET)
}

pub fn forged_token_for(user_id: Uuid) -> String {
    sign(
        user_id,
        Utc::now().timestamp() + 600,
        "not-the-server-secret-not-the-server",
    )
}

/// Real JWT verification, plus a count of how often it was asked.
pub struct CountingVerifier {
    inner: JwtVerifier,
    calls: AtomicUsize,
}

impl CountingVerifier {
    pub fn new() -> Self {
        Self {
            inner: jwt_verifier(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TokenVerifier for CountingVerifier {
    fn verify(&self, token: &str) -> Result<VerifiedAccessToken, AccessJwtError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.verify(token)
    }
}

pub fn robot(name: &str, owner_id: Uuid) -> RobotRow {
    let now = Utc::now();
    RobotRow {
        id: Uuid::new_v4(),
        name: name.to_string(),
        image: format!("https://robots.example/{name}.png"),
        speed: 7,
        strength: 5,
        creation_date: now.date_naive(),
        owner_id,
        created_at: now,
        updated_at: now,
    }
}

pub fn user(user_name: &str, plain_password: &str) -> UserRow {
    UserRow {
        id: Uuid::new_v4(),
        user_name: user_name.to_string(),
        email: format!("{user_name}@planet.express"),
        password_hash: password::hash(plain_password).expect("hash test password"),
        created_at: Utc::now(),
    }
}

#[derive(Default)]
pub struct InMemoryRobots {
    rows: Mutex<Vec<RobotRow>>,
    // Some: behaves like the owner foreign key, only these user ids exist
    known_owners: Option<Vec<Uuid>>,
}

impl InMemoryRobots {
    pub fn with(rows: Vec<RobotRow>) -> Self {
        Self {
            rows: Mutex::new(rows),
            known_owners: None,
        }
    }

    pub fn with_known_owners(mut self, owners: Vec<Uuid>) -> Self {
        self.known_owners = Some(owners);
        self
    }

    pub fn ids(&self) -> Vec<Uuid> {
        self.rows.lock().unwrap().iter().map(|r| r.id).collect()
    }

    pub fn find(&self, robot_id: Uuid) -> Option<RobotRow> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == robot_id)
            .cloned()
    }
}

#[async_trait]
impl RobotStore for InMemoryRobots {
    async fn list(&self) -> RepoResult<Vec<RobotRow>> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn get(&self, robot_id: Uuid) -> RepoResult<RobotRow> {
        self.find(robot_id).ok_or(RepoError::not_found("robot"))
    }

    async fn create(&self, new: NewRobot) -> RepoResult<RobotRow> {
        if let Some(owners) = &self.known_owners
            && !owners.contains(&new.owner_id)
        {
            return Err(RepoError::MissingReference);
        }
        let now = Utc::now();
        let row = RobotRow {
            id: Uuid::new_v4(),
            name: new.name,
            image: new.image,
            speed: new.speed,
            strength: new.strength,
            creation_date: new.creation_date.unwrap_or_else(|| now.date_naive()),
            owner_id: new.owner_id,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn update(&self, robot_id: Uuid, changes: RobotChanges) -> RepoResult<RobotRow> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|r| r.id == robot_id)
            .ok_or(RepoError::not_found("robot"))?;

        if let Some(name) = changes.name {
            row.name = name;
        }
        if let Some(image) = changes.image {
            row.image = image;
        }
        if let Some(speed) = changes.speed {
            row.speed = speed;
        }
        if let Some(strength) = changes.strength {
            row.strength = strength;
        }
        if let Some(creation_date) = changes.creation_date {
            row.creation_date = creation_date;
        }
        row.updated_at = Utc::now();

        Ok(row.clone())
    }

    async fn delete(&self, robot_id: Uuid) -> RepoResult<Uuid> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.id != robot_id);
        if rows.len() == before {
            return Err(RepoError::not_found("robot"));
        }
        Ok(robot_id)
    }
}

#[async_trait]
impl OwnerLookup for InMemoryRobots {
    async fn owner_of(&self, robot_id: Uuid) -> RepoResult<Uuid> {
        self.find(robot_id)
            .map(|r| r.owner_id)
            .ok_or(RepoError::not_found("robot"))
    }
}

#[derive(Default)]
pub struct InMemoryUsers {
    rows: Mutex<Vec<UserRow>>,
}

impl InMemoryUsers {
    pub fn with(rows: Vec<UserRow>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }

    pub fn find(&self, user_id: Uuid) -> Option<UserRow> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
    }

    fn taken(rows: &[UserRow], except: Option<Uuid>, user_name: &str, email: &str) -> bool {
        rows.iter()
            .filter(|u| Some(u.id) != except)
            .any(|u| u.user_name == user_name || u.email == email)
    }
}

#[async_trait]
impl UserStore for InMemoryUsers {
    async fn list(&self) -> RepoResult<Vec<UserRow>> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn get(&self, user_id: Uuid) -> RepoResult<UserRow> {
        self.find(user_id).ok_or(RepoError::not_found("user"))
    }

    async fn find_by_name(&self, user_name: &str) -> RepoResult<UserRow> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.user_name == user_name)
            .cloned()
            .ok_or(RepoError::not_found("user"))
    }

    async fn create(&self, new: NewUser) -> RepoResult<UserRow> {
        let mut rows = self.rows.lock().unwrap();
        if Self::taken(&rows, None, &new.user_name, &new.email) {
            return Err(RepoError::Conflict);
        }
        let row = UserRow {
            id: Uuid::new_v4(),
            user_name: new.user_name,
            email: new.email,
            password_hash: new.password_hash,
            created_at: Utc::now(),
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, user_id: Uuid, changes: UserChanges) -> RepoResult<UserRow> {
        let mut rows = self.rows.lock().unwrap();
        let current = rows
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or(RepoError::not_found("user"))?;

        let user_name = changes.user_name.unwrap_or(current.user_name);
        let email = changes.email.unwrap_or(current.email);
        if Self::taken(&rows, Some(user_id), &user_name, &email) {
            return Err(RepoError::Conflict);
        }

        let row = rows
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(RepoError::not_found("user"))?;
        row.user_name = user_name;
        row.email = email;
        if let Some(hash) = changes.password_hash {
            row.password_hash = hash;
        }
        Ok(row.clone())
    }

    async fn delete(&self, user_id: Uuid) -> RepoResult<Uuid> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|u| u.id != user_id);
        if rows.len() == before {
            return Err(RepoError::not_found("user"));
        }
        Ok(user_id)
    }
}

#[async_trait]
impl OwnerLookup for InMemoryUsers {
    async fn owner_of(&self, user_id: Uuid) -> RepoResult<Uuid> {
        self.find(user_id)
            .map(|u| u.id)
            .ok_or(RepoError::not_found("user"))
    }
}

pub fn state(robots: Arc<InMemoryRobots>, users: Arc<InMemoryUsers>) -> AppState {
    AppState::new(robots, users, Arc::new(jwt_verifier()), Arc::new(issuer()))
}

pub fn config() -> Config {
    Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://localhost/robots_test".to_string()),
        "JWT_SECRET" => Some(SECRET.to_string()),
        _ => None,
    })
    .expect("test config")
}

/// The full application router (all Router-wide layers included).
pub fn app(state: AppState) -> Router {
    crate::app::build_router(state, &config())
}

pub fn request(method: &str, uri: &str, as_user: Option<Uuid>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(user_id) = as_user {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token_for(user_id)));
    }

    let req = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    };
    req.expect("build request")
}

/// Sends one request and returns the status and the JSON body (`Null` when empty).
pub async fn send(router: Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = router.oneshot(req).await.expect("infallible router");
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("read body");

    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, body)
}
