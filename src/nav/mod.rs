pub mod controller;
pub mod icons;
pub mod layout;
pub mod path;
pub mod probe;
pub mod tree;
