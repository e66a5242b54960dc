mod cname_flattening;
mod forward;

pub use cname_flattening::CnameFlatteningHandler;
pub use forward::ForwardHandler;
