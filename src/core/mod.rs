pub mod annotations;
pub mod codebook;
pub mod comparator;
pub mod extract;
pub mod metadata;
pub mod sampling;
pub mod sentences;
pub mod whowhat;
