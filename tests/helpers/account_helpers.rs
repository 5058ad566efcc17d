use axum_test::{TestResponse, TestServer};
use cleanup_dispatch::entities::account::{AccountCreate, AccountRole};
use cleanup_dispatch::interfaces::repositories::account_ifce::AccountRepositoryInterface;
use cleanup_dispatch::middleware::ctx::Identity;
use cleanup_dispatch::middleware::mw_ctx::CtxState;
use cleanup_dispatch::models::view::account::RegisterResponse;
use fake::{faker, Fake};
use serde_json::json;

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct TestAccount {
    pub id: String,
    pub token: String,
    pub role: AccountRole,
}

#[allow(dead_code)]
impl TestAccount {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    pub fn identity(&self) -> Identity {
        Identity {
            account_id: self.id.clone(),
            role: self.role,
        }
    }
}

#[allow(dead_code)]
pub async fn register_response(server: &TestServer, display_name: &str, role: AccountRole) -> TestResponse {
    server
        .post("/api/accounts")
        .json(&json!({ "display_name": display_name, "role": role }))
        .add_header("Accept", "application/json")
        .await
}

#[allow(dead_code)]
pub async fn register_account(server: &TestServer, role: AccountRole) -> TestAccount {
    let name = faker::name::en::Name().fake::<String>();
    let res = register_response(server, &name, role).await;
    res.assert_status_success();
    let body = res.json::<RegisterResponse>();
    TestAccount {
        id: body.id,
        token: body.token,
        role,
    }
}

/// Creates an account with a chosen id straight through the repository.
#[allow(dead_code)]
pub async fn create_account_with_id(
    ctx_state: &CtxState,
    id: &str,
    display_name: &str,
    role: AccountRole,
) -> TestAccount {
    let account = ctx_state
        .db
        .accounts
        .create(AccountCreate {
            id: Some(id.to_string()),
            display_name: display_name.to_string(),
            role,
        })
        .await
        .expect("account created");
    let token = ctx_state
        .jwt
        .create_for_account(&account.id_str(), role)
        .expect("token issued");
    TestAccount {
        id: account.id_str(),
        token,
        role,
    }
}

#[allow(dead_code)]
pub async fn get_current_account(server: &TestServer, account: &TestAccount) -> TestResponse {
    server
        .get("/api/accounts/current")
        .add_header("Authorization", account.bearer())
        .add_header("Accept", "application/json")
        .await
}
