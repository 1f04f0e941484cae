pub mod alias;
pub mod binne;
pub mod corpus;
pub mod fast_math;
pub mod pair_table;
pub mod unigram;
