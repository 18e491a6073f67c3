mod post_form;

pub use post_form::*;
