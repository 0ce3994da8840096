//! Named entities: categories, roles, tonalities, event types and artists
//!
//! All five share the `{id, nome}` shape (tonalities use `tom`) and a
//! uniqueness rule on that single text column.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

/// Which named-entity table a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKind {
    Category,
    Role,
    Tonality,
    EventType,
    Artist,
}

/// Entity-specific response and error text
#[derive(Debug)]
pub struct KindMessages {
    pub name_required: &'static str,
    pub id_required: &'static str,
    pub not_found: &'static str,
    pub conflict: &'static str,
    pub created: &'static str,
    pub updated: &'static str,
    pub deleted: &'static str,
    /// Delete blocked by rows that still reference this one
    pub in_use: &'static str,
}

const CATEGORY: KindMessages = KindMessages {
    name_required: "Nome da categoria é obrigatório",
    id_required: "ID da categoria é obrigatório",
    not_found: "Categoria não encontrada",
    conflict: "Já existe uma categoria com esse nome",
    created: "Categoria criada com sucesso",
    updated: "Categoria atualizada com sucesso",
    deleted: "Categoria removida com sucesso",
    in_use: "Categoria está em uso",
};

const ROLE: KindMessages = KindMessages {
    name_required: "Nome da função é obrigatório",
    id_required: "ID da função é obrigatório",
    not_found: "Função não encontrada",
    conflict: "Já existe uma função com esse nome",
    created: "Função criada com sucesso",
    updated: "Função atualizada com sucesso",
    deleted: "Função removida com sucesso",
    in_use: "Função está em uso",
};

const TONALITY: KindMessages = KindMessages {
    name_required: "Tom é obrigatório",
    id_required: "ID da tonalidade é obrigatório",
    not_found: "Tonalidade não encontrada",
    conflict: "Já existe uma tonalidade com esse tom",
    created: "Tonalidade criada com sucesso",
    updated: "Tonalidade atualizada com sucesso",
    deleted: "Tonalidade removida com sucesso",
    in_use: "Tonalidade está em uso",
};

const EVENT_TYPE: KindMessages = KindMessages {
    name_required: "Nome do tipo de evento é obrigatório",
    id_required: "ID do tipo de evento é obrigatório",
    not_found: "Tipo de evento não encontrado",
    conflict: "Já existe um tipo de evento com esse nome",
    created: "Tipo de evento criado com sucesso",
    updated: "Tipo de evento atualizado com sucesso",
    deleted: "Tipo de evento removido com sucesso",
    in_use: "Tipo de evento está em uso",
};

const ARTIST: KindMessages = KindMessages {
    name_required: "Nome do artista é obrigatório",
    id_required: "ID do artista é obrigatório",
    not_found: "Artista não encontrado",
    conflict: "Já existe um artista com esse nome",
    created: "Artista criado com sucesso",
    updated: "Artista atualizado com sucesso",
    deleted: "Artista removido com sucesso",
    in_use: "Artista possui versões cadastradas",
};

impl NamedKind {
    pub const ALL: [NamedKind; 5] = [
        Self::Category,
        Self::Role,
        Self::Tonality,
        Self::EventType,
        Self::Artist,
    ];

    /// Database table name
    pub fn table(self) -> &'static str {
        match self {
            Self::Category => "categorias",
            Self::Role => "funcoes",
            Self::Tonality => "tonalidades",
            Self::EventType => "tipos_eventos",
            Self::Artist => "artistas",
        }
    }

    /// Name of the unique text column (also the JSON field name)
    pub fn column(self) -> &'static str {
        match self {
            Self::Tonality => "tom",
            _ => "nome",
        }
    }

    /// URL segment under `/api`
    pub fn path(self) -> &'static str {
        match self {
            Self::Category => "categorias",
            Self::Role => "funcoes",
            Self::Tonality => "tonalidades",
            Self::EventType => "tipos-eventos",
            Self::Artist => "artistas",
        }
    }

    /// Singular JSON key used in `{msg, <key>}` envelopes
    pub fn json_key(self) -> &'static str {
        match self {
            Self::Category => "categoria",
            Self::Role => "funcao",
            Self::Tonality => "tonalidade",
            Self::EventType => "tipo_evento",
            Self::Artist => "artista",
        }
    }

    pub fn messages(self) -> &'static KindMessages {
        match self {
            Self::Category => &CATEGORY,
            Self::Role => &ROLE,
            Self::Tonality => &TONALITY,
            Self::EventType => &EVENT_TYPE,
            Self::Artist => &ARTIST,
        }
    }
}

/// A row from one of the named-entity tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedRecord {
    pub kind: NamedKind,
    pub id: Uuid,
    pub name: String,
}

impl NamedRecord {
    pub fn new(kind: NamedKind, id: Uuid, name: impl Into<String>) -> Self {
        Self {
            kind,
            id,
            name: name.into(),
        }
    }
}

// Serialized as `{id, nome}` or `{id, tom}` depending on the kind.
impl Serialize for NamedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("NamedRecord", 2)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field(self.kind.column(), &self.name)?;
        state.end()
    }
}

/// Request body for create/update of any named entity
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedPayload {
    #[serde(default, alias = "name", alias = "tom", alias = "tone")]
    pub nome: Option<String>,
}
