pub mod args;
pub mod op;
pub mod ops;

pub use ops::{
    Friend, Handshake, Init, Locations, Login, Logout, Register, Share, ShowIdentity,
};
