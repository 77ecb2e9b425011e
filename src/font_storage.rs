use std::{collections::HashMap, path::PathBuf, sync::Arc};

use crate::{backend::FontdueBackend, error::FontError};

/// Weight and slant requested for a font.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FontStyle {
    pub bold: bool,
    pub italic: bool,
}

/// Which font to load and at what size.
#[derive(Clone, Debug, PartialEq)]
pub struct FontRequest {
    /// Family names in order of preference. The generic names `serif`,
    /// `sans-serif`, `monospace`, `cursive` and `fantasy` are understood.
    pub families: Vec<String>,
    /// Pixel size. Clamped to [`MIN_FONT_SIZE`](crate::backend::MIN_FONT_SIZE).
    pub size: f32,
    pub style: FontStyle,
    /// Family tried when none of `families` can be loaded.
    pub fallback_family: Option<String>,
}

impl Default for FontRequest {
    fn default() -> Self {
        Self {
            families: vec!["sans-serif".to_string()],
            size: 12.0,
            style: FontStyle::default(),
            fallback_family: None,
        }
    }
}

impl FontRequest {
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            families: vec![family.into()],
            size,
            ..Default::default()
        }
    }

    pub fn with_style(self, style: FontStyle) -> Self {
        Self { style, ..self }
    }

    pub fn with_fallback(self, family: impl Into<String>) -> Self {
        Self {
            fallback_family: Some(family.into()),
            ..self
        }
    }
}

/// Manages font loading and retrieval using `fontdb` and `fontdue`.
///
/// Faces are registered in a `fontdb` database and only parsed by `fontdue`
/// when a backend is built for them. Parsed fonts are kept, so reloading the
/// same face at another size is cheap.
pub struct FontStorage {
    /// This is the font set that has been loaded by fontdb.
    font_db: fontdb::Database,
    /// Faces already parsed by fontdue.
    loaded_font: HashMap<fontdb::ID, Arc<fontdue::Font>, fxhash::FxBuildHasher>,
}

impl Default for FontStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl FontStorage {
    /// Creates a new empty font storage.
    pub fn new() -> Self {
        Self {
            font_db: fontdb::Database::new(),
            loaded_font: HashMap::with_hasher(fxhash::FxBuildHasher::default()),
        }
    }
}

/// Loading fonts into fontdb and setting up fontdb.
impl FontStorage {
    /// Loads a font from binary data.
    pub fn load_font_binary(&mut self, data: impl Into<Vec<u8>>) {
        self.font_db.load_font_data(data.into());
    }

    /// Loads a font from a file path.
    pub fn load_font_file(&mut self, path: PathBuf) -> Result<(), FontError> {
        self.font_db.load_font_file(path)?;
        Ok(())
    }

    /// Loads all fonts from a directory.
    pub fn load_fonts_dir(&mut self, dir: PathBuf) {
        self.font_db.load_fonts_dir(dir)
    }

    /// Loads the system fonts.
    pub fn load_system_fonts(&mut self) {
        self.font_db.load_system_fonts();
    }

    pub fn is_empty(&self) -> bool {
        self.font_db.is_empty()
    }

    /// Returns the number of registered faces.
    pub fn len(&self) -> usize {
        self.font_db.len()
    }

    /// Sets the family name for the "sans-serif" generic family.
    pub fn set_sans_serif_family(&mut self, family: impl Into<String>) {
        self.font_db.set_sans_serif_family(family);
    }

    /// Sets the family name for the "monospace" generic family.
    pub fn set_monospace_family(&mut self, family: impl Into<String>) {
        self.font_db.set_monospace_family(family);
    }

    /// Returns an iterator over all available faces.
    pub fn faces(&self) -> impl Iterator<Item = &fontdb::FaceInfo> {
        self.font_db.faces()
    }
}

/// Resolving requests
impl FontStorage {
    /// Builds a rasterizing backend for `request`.
    ///
    /// When no face of the requested families can be loaded the fallback
    /// family is tried before giving up.
    pub fn load_backend(&mut self, request: &FontRequest) -> Result<FontdueBackend, FontError> {
        let (id, font) = match self.load_face(&request.families, request.style) {
            Ok(found) => found,
            Err(err) => {
                let Some(fallback) = &request.fallback_family else {
                    return Err(err);
                };
                log::warn!("{err}, falling back to font family {fallback}");
                self.load_face(std::slice::from_ref(fallback), request.style)?
            }
        };

        if let Some(face) = self.font_db.face(id) {
            log::info!(
                "Loaded font {} at {}px",
                face.post_script_name,
                request.size
            );
        }

        Ok(FontdueBackend::new(font, request.size))
    }

    /// Retrieves a parsed font by ID, parsing it if necessary.
    pub fn font(&mut self, id: fontdb::ID) -> Result<Arc<fontdue::Font>, FontError> {
        use std::collections::hash_map::Entry;

        match self.loaded_font.entry(id) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let font_result = self
                    .font_db
                    .with_face_data(id, |data, index| {
                        fontdue::Font::from_bytes(
                            data,
                            fontdue::FontSettings {
                                collection_index: index,
                                scale: 40.0,
                                load_substitutions: true,
                            },
                        )
                    })
                    .ok_or_else(|| FontError::FaceUnavailable {
                        face: format!("{id:?}"),
                    })?;

                match font_result {
                    Ok(font) => Ok(Arc::clone(entry.insert(Arc::new(font)))),
                    Err(reason) => {
                        log::error!("Failed to load font (id: {:?}): {}", id, reason);
                        Err(FontError::Parse {
                            face: format!("{id:?}"),
                            reason: reason.to_string(),
                        })
                    }
                }
            }
        }
    }

    fn load_face(
        &mut self,
        families: &[String],
        style: FontStyle,
    ) -> Result<(fontdb::ID, Arc<fontdue::Font>), FontError> {
        let families_query: Vec<fontdb::Family<'_>> =
            families.iter().map(|name| family(name)).collect();
        let query = fontdb::Query {
            families: &families_query,
            weight: if style.bold {
                fontdb::Weight::BOLD
            } else {
                fontdb::Weight::NORMAL
            },
            stretch: fontdb::Stretch::Normal,
            style: if style.italic {
                fontdb::Style::Italic
            } else {
                fontdb::Style::Normal
            },
        };

        let id = self
            .font_db
            .query(&query)
            .ok_or_else(|| FontError::NotFound {
                families: families.join(", "),
            })?;

        self.font(id).map(|font| (id, font))
    }
}

fn family(name: &str) -> fontdb::Family<'_> {
    match name {
        "serif" => fontdb::Family::Serif,
        "sans-serif" => fontdb::Family::SansSerif,
        "monospace" => fontdb::Family::Monospace,
        "cursive" => fontdb::Family::Cursive,
        "fantasy" => fontdb::Family::Fantasy,
        name => fontdb::Family::Name(name),
    }
}
