//! Many-to-many associations (junction tables)

use serde::{Deserialize, Serialize};

use super::{MemberRecord, NamedKind, NamedRecord, SongSummary};

/// Any entity that can own or be the target of an association
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Named(NamedKind),
    Member,
    Song,
    Event,
}

impl Entity {
    pub fn table(self) -> &'static str {
        match self {
            Self::Named(kind) => kind.table(),
            Self::Member => "integrantes",
            Self::Song => "musicas",
            Self::Event => "eventos",
        }
    }

    pub fn id_required(self) -> &'static str {
        match self {
            Self::Named(kind) => kind.messages().id_required,
            Self::Member => "ID do integrante é obrigatório",
            Self::Song => "ID da música é obrigatório",
            Self::Event => "ID do evento é obrigatório",
        }
    }

    pub fn not_found(self) -> &'static str {
        match self {
            Self::Named(kind) => kind.messages().not_found,
            Self::Member => "Integrante não encontrado",
            Self::Song => "Música não encontrada",
            Self::Event => "Evento não encontrado",
        }
    }
}

/// Text for one association type
#[derive(Debug)]
pub struct LinkMessages {
    pub conflict: &'static str,
    pub added: &'static str,
    pub removed: &'static str,
    pub missing: &'static str,
}

/// The five junction tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Link {
    MemberRole,
    SongCategory,
    SongRole,
    EventSong,
    EventMember,
}

impl Link {
    pub const ALL: [Link; 5] = [
        Self::MemberRole,
        Self::SongCategory,
        Self::SongRole,
        Self::EventSong,
        Self::EventMember,
    ];

    pub fn owner(self) -> Entity {
        match self {
            Self::MemberRole => Entity::Member,
            Self::SongCategory | Self::SongRole => Entity::Song,
            Self::EventSong | Self::EventMember => Entity::Event,
        }
    }

    pub fn target(self) -> Entity {
        match self {
            Self::MemberRole | Self::SongRole => Entity::Named(NamedKind::Role),
            Self::SongCategory => Entity::Named(NamedKind::Category),
            Self::EventSong => Entity::Song,
            Self::EventMember => Entity::Member,
        }
    }

    /// Junction table name
    pub fn table(self) -> &'static str {
        match self {
            Self::MemberRole => "integrantes_funcoes",
            Self::SongCategory => "musicas_categorias",
            Self::SongRole => "musicas_funcoes",
            Self::EventSong => "eventos_musicas",
            Self::EventMember => "eventos_integrantes",
        }
    }

    /// Foreign-key column pointing at the owner
    pub fn owner_column(self) -> &'static str {
        match self.owner() {
            Entity::Member => "integrante_id",
            Entity::Song => "musica_id",
            _ => "evento_id",
        }
    }

    /// Foreign-key column pointing at the target; also the request body field
    pub fn target_column(self) -> &'static str {
        match self.target() {
            Entity::Named(NamedKind::Category) => "categoria_id",
            Entity::Song => "musica_id",
            Entity::Member => "integrante_id",
            _ => "funcao_id",
        }
    }

    /// URL segment under the owner's `/{id}`
    pub fn path(self) -> &'static str {
        match self {
            Self::MemberRole | Self::SongRole => "funcoes",
            Self::SongCategory => "categorias",
            Self::EventSong => "musicas",
            Self::EventMember => "integrantes",
        }
    }

    pub fn messages(self) -> &'static LinkMessages {
        match self {
            Self::MemberRole => &LinkMessages {
                conflict: "Integrante já possui essa função",
                added: "Função vinculada ao integrante com sucesso",
                removed: "Função desvinculada do integrante com sucesso",
                missing: "Vínculo entre integrante e função não encontrado",
            },
            Self::SongCategory => &LinkMessages {
                conflict: "Música já possui essa categoria",
                added: "Categoria vinculada à música com sucesso",
                removed: "Categoria desvinculada da música com sucesso",
                missing: "Vínculo entre música e categoria não encontrado",
            },
            Self::SongRole => &LinkMessages {
                conflict: "Música já possui essa função",
                added: "Função vinculada à música com sucesso",
                removed: "Função desvinculada da música com sucesso",
                missing: "Vínculo entre música e função não encontrado",
            },
            Self::EventSong => &LinkMessages {
                conflict: "Música já está no evento",
                added: "Música adicionada ao evento com sucesso",
                removed: "Música removida do evento com sucesso",
                missing: "Música não está vinculada ao evento",
            },
            Self::EventMember => &LinkMessages {
                conflict: "Integrante já está no evento",
                added: "Integrante adicionado ao evento com sucesso",
                removed: "Integrante removido do evento com sucesso",
                missing: "Integrante não está vinculado ao evento",
            },
        }
    }
}

/// Targets of an association, flattened out of the junction rows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LinkedItems {
    Named(Vec<NamedRecord>),
    Songs(Vec<SongSummary>),
    Members(Vec<MemberRecord>),
}

impl LinkedItems {
    pub fn len(&self) -> usize {
        match self {
            Self::Named(items) => items.len(),
            Self::Songs(items) => items.len(),
            Self::Members(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// POST body for any association; the route decides which field is read
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkPayload {
    #[serde(default, alias = "roleId")]
    pub funcao_id: Option<String>,
    #[serde(default, alias = "categoryId")]
    pub categoria_id: Option<String>,
    #[serde(default, alias = "songId")]
    pub musica_id: Option<String>,
    #[serde(default, alias = "memberId")]
    pub integrante_id: Option<String>,
}

impl LinkPayload {
    pub fn target(&self, link: Link) -> Option<&str> {
        let field = match link.target() {
            Entity::Named(NamedKind::Category) => &self.categoria_id,
            Entity::Song => &self.musica_id,
            Entity::Member => &self.integrante_id,
            _ => &self.funcao_id,
        };
        field.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_reads_the_link_target_field() {
        let payload: LinkPayload =
            serde_json::from_str(r#"{"funcao_id": "a", "musica_id": "b"}"#).unwrap();
        assert_eq!(payload.target(Link::MemberRole), Some("a"));
        assert_eq!(payload.target(Link::SongRole), Some("a"));
        assert_eq!(payload.target(Link::EventSong), Some("b"));
        assert_eq!(payload.target(Link::EventMember), None);
    }

    #[test]
    fn target_column_matches_body_field() {
        for link in Link::ALL {
            let body = format!(r#"{{"{}": "x"}}"#, link.target_column());
            let payload: LinkPayload = serde_json::from_str(&body).unwrap();
            assert_eq!(payload.target(link), Some("x"), "{:?}", link);
        }
    }

    #[test]
    fn owner_and_target_columns_differ() {
        for link in Link::ALL {
            assert_ne!(link.owner_column(), link.target_column());
        }
    }
}
