use super::*;

mod maintenance;
mod preference;
