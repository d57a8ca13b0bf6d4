mod authority;
mod peers;

pub use authority::SessionResolver;
pub use peers::PeerEntityMap;
