use serde::Deserialize;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateOwnerRequest {
    pub admin_password: String,
    pub email: String,
    pub shop_code: String,
}

#[derive(Debug, Deserialize)]
pub struct OwnerLoginRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct OwnerVerifyRequest {
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct PostTransactionRequest {
    pub customer_code: String,
    /// Signed, non-zero; positive extends credit, negative records payment.
    pub amount: i64,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CustomerLoginRequest {
    pub shop_code: String,
    pub customer_code: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}
