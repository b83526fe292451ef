/// Authentication primitives for pawshop
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`session`]: signed session tokens carried in an HTTP-only cookie
/// - [`reset_token`]: single-use password-reset tokens, stored as digests
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **Session Tokens**: HS256 signing with a 24 hour expiry
/// - **Reset Tokens**: 256-bit random tokens, only the SHA-256 digest is
///   ever persisted
/// - **Constant-time Comparison**: all verification uses constant-time
///   operations

pub mod password;
pub mod reset_token;
pub mod session;
