//! Members: required fields, CPF normalization, password hashing

use std::sync::Arc;

use crate::db::Store;
use crate::error::{AppError, AppResult};
use crate::models::{
    non_blank, Cpf, Email, Entity, MemberChanges, MemberPayload, MemberRecord, NewMember,
};

use super::parse_id;
use super::password::hash_password;

pub const CREATED: &str = "Integrante criado com sucesso";
pub const UPDATED: &str = "Integrante atualizado com sucesso";
pub const DELETED: &str = "Integrante removido com sucesso";
const MISSING_FIELDS: &str = "Campos obrigatórios ausentes";
const EMPTY_UPDATE: &str = "Nenhum dado enviado";
const CPF_TAKEN: &str = "CPF já cadastrado";

#[derive(Clone)]
pub struct MemberService {
    store: Arc<dyn Store>,
}

impl MemberService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Vec<MemberRecord>> {
        Ok(self.store.list_members().await?)
    }

    pub async fn get(&self, id: &str) -> AppResult<MemberRecord> {
        let id = parse_id(id, Entity::Member)?;
        self.store
            .get_member(id)
            .await?
            .ok_or_else(|| AppError::not_found(Entity::Member.not_found()))
    }

    /// Create a member. Every missing required field is reported at once.
    pub async fn create(&self, payload: MemberPayload) -> AppResult<MemberRecord> {
        let name = non_blank(payload.nome);
        let cpf = payload.cpf.as_deref().and_then(|raw| Cpf::new(raw).ok());
        let email = non_blank(payload.email);
        let password = payload.senha.filter(|p| !p.is_empty());

        let mut missing = Vec::new();
        if name.is_none() {
            missing.push("Nome é obrigatório".to_string());
        }
        if cpf.is_none() {
            missing.push("CPF é obrigatório".to_string());
        }
        if email.is_none() {
            missing.push("E-mail é obrigatório".to_string());
        }
        if password.is_none() {
            missing.push("Senha é obrigatória".to_string());
        }
        let (Some(name), Some(cpf), Some(email), Some(password)) = (name, cpf, email, password)
        else {
            return Err(AppError::validation(MISSING_FIELDS).with_details(missing));
        };

        let email = Email::new(&email)?;
        let password_hash = hash_password(password).await?;

        let member = self
            .store
            .insert_member(NewMember {
                name,
                cpf,
                email,
                phone: non_blank(payload.telefone.flatten()),
                password_hash,
            })
            .await
            .map_err(|e| AppError::from_db(e, CPF_TAKEN))?;
        tracing::info!(id = %member.id, "member created");
        Ok(member)
    }

    /// Partial update. Only supplied fields change; a new password is
    /// re-hashed, otherwise the stored hash is left alone.
    pub async fn update(&self, id: &str, payload: MemberPayload) -> AppResult<MemberRecord> {
        let current = self.get(id).await?;
        if payload.is_empty() {
            return Err(AppError::validation(EMPTY_UPDATE));
        }

        let mut changes = MemberChanges::default();
        if let Some(raw) = payload.nome {
            changes.name =
                Some(non_blank(Some(raw)).ok_or_else(|| AppError::validation("Nome é obrigatório"))?);
        }
        if let Some(raw) = payload.cpf {
            changes.cpf = Some(Cpf::new(&raw)?);
        }
        if let Some(raw) = payload.email {
            changes.email = Some(Email::new(&raw)?);
        }
        // Blank or null clears the phone.
        changes.phone = payload.telefone.map(non_blank);
        if let Some(password) = payload.senha.filter(|p| !p.is_empty()) {
            changes.password_hash = Some(hash_password(password).await?);
        }

        let member = self
            .store
            .update_member(current.id, changes)
            .await
            .map_err(|e| AppError::from_db(e, CPF_TAKEN))?
            .ok_or_else(|| AppError::not_found(Entity::Member.not_found()))?;
        tracing::info!(id = %member.id, "member updated");
        Ok(member)
    }

    pub async fn delete(&self, id: &str) -> AppResult<MemberRecord> {
        let id = parse_id(id, Entity::Member)?;
        let member = self
            .store
            .delete_member(id)
            .await?
            .ok_or_else(|| AppError::not_found(Entity::Member.not_found()))?;
        tracing::info!(id = %member.id, "member deleted");
        Ok(member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::services::test_support::services;

    fn ana(cpf: &str) -> MemberPayload {
        MemberPayload {
            nome: Some("Ana".into()),
            cpf: Some(cpf.into()),
            email: Some("ana@igreja.org".into()),
            telefone: Some(Some("11 99999-0000".into())),
            senha: Some("segredo".into()),
        }
    }

    #[tokio::test]
    async fn create_normalizes_cpf_and_hides_password() {
        let services = services();
        let member = services.members.create(ana("123.456.789-00")).await.unwrap();
        assert_eq!(member.cpf, "12345678900");

        let json = serde_json::to_value(&member).unwrap();
        assert!(json.get("senha").is_none());
        assert!(json.get("senha_hash").is_none());
        assert_eq!(json["telefone"], "11 99999-0000");
    }

    #[tokio::test]
    async fn formatted_and_plain_cpf_collide() {
        let services = services();
        services.members.create(ana("123.456.789-00")).await.unwrap();

        let err = services.members.create(ana("12345678900")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.message(), "CPF já cadastrado");
    }

    #[tokio::test]
    async fn missing_fields_are_listed_together() {
        let services = services();
        let err = services
            .members
            .create(MemberPayload {
                nome: Some("Ana".into()),
                cpf: Some("--".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.message(), "Campos obrigatórios ausentes");
        assert_eq!(
            err.details(),
            [
                "CPF é obrigatório",
                "E-mail é obrigatório",
                "Senha é obrigatória"
            ]
        );
    }

    #[tokio::test]
    async fn invalid_email_is_rejected() {
        let services = services();
        let mut payload = ana("1");
        payload.email = Some("ana.igreja.org".into());
        let err = services.members.create(payload).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn empty_update_is_rejected() {
        let services = services();
        let member = services.members.create(ana("1")).await.unwrap();
        let err = services
            .members
            .update(&member.id.to_string(), MemberPayload::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.message(), "Nenhum dado enviado");
    }

    #[tokio::test]
    async fn update_rechecks_cpf_excluding_self() {
        let services = services();
        let first = services.members.create(ana("111")).await.unwrap();
        services.members.create(ana("222")).await.unwrap();
        let id = first.id.to_string();

        let same = services
            .members
            .update(
                &id,
                MemberPayload {
                    cpf: Some("1-1-1".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(same.cpf, "111");

        let err = services
            .members
            .update(
                &id,
                MemberPayload {
                    cpf: Some("222".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn update_changes_only_supplied_fields() {
        let services = services();
        let member = services.members.create(ana("1")).await.unwrap();

        let updated = services
            .members
            .update(
                &member.id.to_string(),
                MemberPayload {
                    nome: Some("Ana Paula".into()),
                    senha: Some("nova".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Ana Paula");
        assert_eq!(updated.email, member.email);
        assert_eq!(updated.phone, member.phone);
    }

    #[tokio::test]
    async fn phone_clears_with_null_or_blank() {
        let services = services();
        let id = services.members.create(ana("1")).await.unwrap().id.to_string();

        for telefone in [Some(None), Some(Some("  ".to_string()))] {
            services
                .members
                .update(
                    &id,
                    MemberPayload {
                        telefone: Some(Some("11 9999".into())),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();

            let cleared = services
                .members
                .update(
                    &id,
                    MemberPayload {
                        telefone,
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
            assert_eq!(cleared.phone, None);
        }
    }

    #[test]
    fn null_phone_is_not_an_empty_body() {
        let payload: MemberPayload = serde_json::from_str(r#"{"telefone": null}"#).unwrap();
        assert_eq!(payload.telefone, Some(None));
        assert!(!payload.is_empty());

        let payload: MemberPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.is_empty());
    }
}
