mod typst;

pub use typst::generate_pdf;
