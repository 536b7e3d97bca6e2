pub mod client_ip;
pub mod cookies;
pub mod id_gen;
pub mod jwt;
pub mod password;
