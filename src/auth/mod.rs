pub mod jwt;
pub mod middleware;
pub mod oauth;
pub mod owner;
