use crate::ir::Type;

type Conversion = Box<dyn Fn(&Type) -> Option<Type>>;

/// Maps source types to their converted form.
///
/// Conversions are tried most-recently-added first; the first one that
/// returns `Some` wins. Types no conversion claims are kept as they are.
#[derive(Default)]
pub struct TypeConverter {
    conversions: Vec<Conversion>,
}

impl TypeConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_conversion(&mut self, f: impl Fn(&Type) -> Option<Type> + 'static) -> &mut Self {
        self.conversions.push(Box::new(f));
        self
    }

    pub fn convert_type(&self, ty: &Type) -> Type {
        self.conversions
            .iter()
            .rev()
            .find_map(|convert| convert(ty))
            .unwrap_or_else(|| ty.clone())
    }

    /// A type is legal when conversion leaves it unchanged.
    pub fn is_legal(&self, ty: &Type) -> bool {
        self.convert_type(ty) == *ty
    }
}
