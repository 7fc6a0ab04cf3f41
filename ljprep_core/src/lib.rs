pub mod catalog;
pub mod lexicon;
pub mod manifest;
pub mod prepare;
pub mod split;
