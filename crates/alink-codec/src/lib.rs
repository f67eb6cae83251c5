//! Codecs between stored asset metadata and the flat editable model.
//!
//! Every codec is a pair of free functions, `decode` and `encode`, one
//! module per stored shape:
//!
//! - [`scalar`]: typed info fields ([`FieldSpec`], [`FieldValue`])
//! - [`collection`]: linked-asset collections in all four encodings
//! - [`credits`]: talent credits grouped by role
//! - [`media`]: images and the image gallery
//! - [`playlist`]: playlists of clips, current and legacy layouts
//! - [`slug`]: [`slugify`]
//!
//! Decoders that follow links take a [`LinkResolver`](alink_resolve::LinkResolver)
//! and degrade rather than fail: skipped entries are logged and reported
//! alongside the result. Encoders are synchronous and pure.

pub mod collection;
pub mod credits;
pub mod error;
pub mod media;
pub mod playlist;
pub mod scalar;
pub mod slug;

pub use collection::{DecodeFailure, DecodedCollection};
pub use credits::{Credit, CreditGroup};
pub use error::{CodecError, CodecResult};
pub use media::{GalleryEntry, ImageEntry};
pub use playlist::{DecodedPlaylists, Playlist, NEW_PLAYLIST_SLUG};
pub use scalar::{EncodedFields, FieldRecord, FieldSpec, FieldType, FieldValue, ListField};
pub use slug::slugify;
