mod common;

mod risk;
