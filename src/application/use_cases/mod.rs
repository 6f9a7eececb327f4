//! Use case implementations.

mod convert_sticker_use_case;

pub use convert_sticker_use_case::ConvertStickerUseCase;
