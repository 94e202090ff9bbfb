use super::NamingStrategy;

/// A record type persisted in its own table.
pub trait Entity {
    fn metadata() -> EntityMetadata;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Uuid,
    Text,
    Boolean,
    Integer,
    Timestamptz,
}

impl ColumnType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ColumnType::Uuid => "uuid",
            ColumnType::Text => "text",
            ColumnType::Boolean => "boolean",
            ColumnType::Integer => "integer",
            ColumnType::Timestamptz => "timestamptz",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetadata {
    pub property: &'static str,
    /// Overrides the naming strategy for this column.
    pub name: Option<&'static str>,
    pub column_type: ColumnType,
    pub primary: bool,
    pub nullable: bool,
    pub unique: bool,
    /// Raw SQL expression, e.g. `now()`.
    pub default: Option<&'static str>,
}

impl ColumnMetadata {
    pub fn new(property: &'static str, column_type: ColumnType) -> Self {
        Self {
            property,
            name: None,
            column_type,
            primary: false,
            nullable: false,
            unique: false,
            default: None,
        }
    }

    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn default(mut self, expression: &'static str) -> Self {
        self.default = Some(expression);
        self
    }

    pub fn column_name(&self, naming: NamingStrategy) -> String {
        naming.column_name(self.property, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMetadata {
    pub name: &'static str,
    /// Overrides the naming strategy for the table.
    pub table: Option<&'static str>,
    pub columns: Vec<ColumnMetadata>,
}

impl EntityMetadata {
    pub fn table_name(&self, naming: NamingStrategy) -> String {
        naming.table_name(self.name, self.table)
    }

    pub fn primary_columns(&self) -> impl Iterator<Item = &ColumnMetadata> {
        self.columns.iter().filter(|c| c.primary)
    }
}

/// The entities the application modules have registered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityRegistry {
    entities: Vec<EntityMetadata>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registering the same entity twice keeps the first registration.
    pub fn register<E: Entity>(mut self) -> Self {
        let metadata = E::metadata();
        if !self.entities.iter().any(|e| e.name == metadata.name) {
            self.entities.push(metadata);
        }
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entities.iter().any(|e| e.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityMetadata> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
