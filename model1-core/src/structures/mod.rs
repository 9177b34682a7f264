//! Value types shared by the scorers: word bags, scored candidates, sparse vectors

mod scored;
mod sparse_vector;
mod word_bag;

pub use scored::*;
pub use sparse_vector::*;
pub use word_bag::*;
