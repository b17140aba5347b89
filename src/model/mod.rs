mod innings;
mod match_detail;
mod matchlist;
mod team;

pub use innings::*;
pub use match_detail::*;
pub use matchlist::*;
pub use team::*;
