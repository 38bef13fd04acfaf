use serde::{Deserialize, Serialize};
use uint::construct_uint;

construct_uint! {
    // Construct an unsigned 256-bit integer
    // consisting of 4 x 64-bit words
    #[derive(Serialize, Deserialize)]
    pub struct U256(4);
}

// the output that receives the block producer's fees
// on a coinbase transaction
pub const COINBASE_FEE_OUTPUT: usize = 0;

pub mod crypto;
pub mod error;
pub mod sha256;
pub mod types;
pub mod util;
