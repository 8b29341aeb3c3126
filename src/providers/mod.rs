pub mod fred;
