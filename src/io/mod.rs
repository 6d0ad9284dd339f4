pub mod images;

pub use images::{list_image_files, load_images_from_folder, ImageInput};
