//! Metadados do esquema relacional
//!
//! Descreve cada tabela (colunas, tipos, nulidade, unicidade, valores padrão)
//! e os relacionamentos entre elas. As migrações criam exatamente estas
//! tabelas; os testes comparam os metadados com o catálogo do SQLite.

/// Tipo semântico de uma coluna
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Inteiro (chaves e códigos numéricos)
    Integer,
    /// Texto com tamanho máximo em caracteres
    Text(usize),
    /// Data e hora (UTC)
    Timestamp,
    /// Somente data
    Date,
    Boolean,
    /// Texto restrito a um conjunto fixo de valores
    Enumerated(&'static [&'static str]),
}

/// Definição de uma coluna
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    /// Identificador da coluna no banco (maiúsculas)
    pub name: &'static str,
    /// Nome do campo correspondente na struct Rust
    pub field: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
    pub unique: bool,
    pub primary_key: bool,
    /// Valor padrão aplicado pelo banco, em SQL
    pub default: Option<&'static str>,
    /// Tabela referenciada, quando a coluna é chave estrangeira
    pub references: Option<&'static str>,
}

const fn column(name: &'static str, field: &'static str, ty: ColumnType) -> ColumnDef {
    ColumnDef {
        name,
        field,
        ty,
        nullable: true,
        unique: false,
        primary_key: false,
        default: None,
        references: None,
    }
}

impl ColumnDef {
    const fn required(mut self) -> Self {
        self.nullable = false;
        self
    }

    const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    const fn key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    const fn default(mut self, sql: &'static str) -> Self {
        self.default = Some(sql);
        self
    }

    const fn references(mut self, table: &'static str) -> Self {
        self.references = Some(table);
        self.nullable = false;
        self
    }

    /// Tamanho máximo para colunas de texto
    pub fn max_len(&self) -> Option<usize> {
        match self.ty {
            ColumnType::Text(len) => Some(len),
            ColumnType::Enumerated(values) => values.iter().map(|v| v.len()).max(),
            _ => None,
        }
    }

    /// Verifica se um valor textual pertence ao conjunto enumerado
    pub fn accepts(&self, value: &str) -> bool {
        match self.ty {
            ColumnType::Enumerated(values) => values.contains(&value),
            ColumnType::Text(len) => value.chars().count() <= len,
            _ => true,
        }
    }
}

/// Forma da chave primária
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryKey {
    /// Inteiro gerado pelo banco
    AutoIncrement(&'static str),
    /// Chave composta pelas chaves estrangeiras (tabela de associação)
    Composite(&'static [&'static str]),
}

/// Definição de uma tabela
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
    pub primary_key: PrimaryKey,
}

pub const DELETED_AT: &str = "DELETED_AT";
pub const UPDATED_AT: &str = "UPDATED_AT";
pub const CREATED_AT: &str = "CREATED_AT";

impl TableDef {
    pub fn column(&self, name: &str) -> Option<&'static ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Tabela possui marcador de remoção lógica
    pub fn soft_delete(&self) -> bool {
        self.has_column(DELETED_AT)
    }

    /// Tabela registra data da última alteração
    pub fn tracks_updates(&self) -> bool {
        self.has_column(UPDATED_AT)
    }

    /// Tabelas referenciadas por chave estrangeira, sem repetição
    pub fn dependencies(&self) -> Vec<&'static str> {
        let mut deps: Vec<&'static str> = Vec::new();
        for parent in self.columns.iter().filter_map(|c| c.references) {
            if !deps.contains(&parent) {
                deps.push(parent);
            }
        }
        deps
    }

    /// Colunas preenchidas na inserção (exclui a chave autoincremento)
    pub fn insertable_columns(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|c| !matches!(self.primary_key, PrimaryKey::AutoIncrement(pk) if pk == c.name))
            .filter(|c| c.name != UPDATED_AT && c.name != DELETED_AT)
            .map(|c| c.name)
            .collect()
    }
}

const ID: ColumnDef = column("ID", "id", ColumnType::Integer).key();
const CREATED: ColumnDef = column(CREATED_AT, "created_at", ColumnType::Timestamp)
    .required()
    .default("CURRENT_TIMESTAMP");
const UPDATED: ColumnDef = column(UPDATED_AT, "updated_at", ColumnType::Timestamp);
const DELETED: ColumnDef = column(DELETED_AT, "deleted_at", ColumnType::Timestamp);

pub const APPOINTMENT_STATUSES: &[&str] = &["scheduled", "completed", "cancelled"];
pub const USER_ROLES: &[&str] = &["admin", "receptionist", "doctor"];

pub static FACILITY: TableDef = TableDef {
    name: "FACILITY",
    columns: &[
        ID,
        column("NAME", "name", ColumnType::Text(100)).required(),
        column("DESCRIPTION", "description", ColumnType::Text(320)).required(),
        CREATED,
        UPDATED,
        DELETED,
    ],
    primary_key: PrimaryKey::AutoIncrement("ID"),
};

pub static AREA: TableDef = TableDef {
    name: "AREA",
    columns: &[
        ID,
        column("FACILITY_ID", "facility_id", ColumnType::Integer).references("FACILITY"),
        column("NAME", "name", ColumnType::Text(100)).required(),
        column("DESCRIPTION", "description", ColumnType::Text(320)).required(),
        CREATED,
        UPDATED,
        DELETED,
    ],
    primary_key: PrimaryKey::AutoIncrement("ID"),
};

pub static DOCTOR: TableDef = TableDef {
    name: "DOCTOR",
    columns: &[
        ID,
        column("FIRST_NAME", "first_name", ColumnType::Text(100)).required(),
        column("LAST_NAME", "last_name", ColumnType::Text(100)).required(),
        column("PHONE", "phone", ColumnType::Text(20)),
        column("EMAIL", "email", ColumnType::Text(200)).required(),
        CREATED,
        UPDATED,
        DELETED,
    ],
    primary_key: PrimaryKey::AutoIncrement("ID"),
};

pub static DOCTOR_FACILITY: TableDef = TableDef {
    name: "DOCTOR_FACILITY",
    columns: &[
        column("AREA_ID", "area_id", ColumnType::Integer).references("AREA").key(),
        column("DOCTOR_ID", "doctor_id", ColumnType::Integer).references("DOCTOR").key(),
    ],
    primary_key: PrimaryKey::Composite(&["AREA_ID", "DOCTOR_ID"]),
};

pub static ROOM: TableDef = TableDef {
    name: "ROOM",
    columns: &[
        ID,
        column("AREA_ID", "area_id", ColumnType::Integer).references("AREA"),
        column("NAME", "name", ColumnType::Text(200)).required().unique(),
        column("DESCRIPTION", "description", ColumnType::Text(300)),
        CREATED,
        DELETED,
    ],
    primary_key: PrimaryKey::AutoIncrement("ID"),
};

pub static PATIENT: TableDef = TableDef {
    name: "PATIENT",
    columns: &[
        ID,
        column("FIRST_NAME", "first_name", ColumnType::Text(100)).required(),
        column("LAST_NAME", "last_name", ColumnType::Text(100)).required(),
        column("DATE_OF_BIRTH", "date_of_birth", ColumnType::Date).required(),
        column("GENDER", "gender", ColumnType::Integer).required(),
        column("PHONE", "phone", ColumnType::Text(50)),
        column("EMAIL", "email", ColumnType::Text(150)).required(),
        column("ADDRESS", "address", ColumnType::Text(250)),
        CREATED,
        UPDATED,
        DELETED,
    ],
    primary_key: PrimaryKey::AutoIncrement("ID"),
};

pub static APPOINTMENT: TableDef = TableDef {
    name: "APPOINTMENT",
    columns: &[
        ID,
        column("PATIENT_ID", "patient_id", ColumnType::Integer).references("PATIENT"),
        column("DOCTOR_ID", "doctor_id", ColumnType::Integer).references("DOCTOR"),
        column("ROOM_ID", "room_id", ColumnType::Integer).references("ROOM"),
        column("START_TIME", "start_time", ColumnType::Timestamp).required(),
        column("END_TIME", "end_time", ColumnType::Timestamp).required(),
        column("STATUS", "status", ColumnType::Enumerated(APPOINTMENT_STATUSES))
            .required()
            .default("'scheduled'"),
        column("DESCRIPTION", "description", ColumnType::Text(500)),
    ],
    primary_key: PrimaryKey::AutoIncrement("ID"),
};

pub static APP_USER: TableDef = TableDef {
    name: "APP_USER",
    columns: &[
        ID,
        column("USERNAME", "username", ColumnType::Text(50)).required(),
        column("EMAIL", "email", ColumnType::Text(100)).required(),
        column("PASSWORD_HASH", "password_hash", ColumnType::Text(100)).required(),
        column("ROLE", "role", ColumnType::Enumerated(USER_ROLES)),
        column("IS_ACTIVE", "is_active", ColumnType::Boolean)
            .required()
            .default("0"),
        CREATED,
        UPDATED,
        DELETED,
    ],
    primary_key: PrimaryKey::AutoIncrement("ID"),
};

/// Todas as tabelas do esquema
pub static TABLES: [&TableDef; 8] = [
    &FACILITY,
    &AREA,
    &DOCTOR,
    &DOCTOR_FACILITY,
    &ROOM,
    &PATIENT,
    &APPOINTMENT,
    &APP_USER,
];

/// Cardinalidade de um relacionamento
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    OneToMany,
    /// Muitos-para-muitos através de uma tabela de associação
    ManyToMany { through: &'static str },
}

/// Relacionamento entre duas tabelas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub parent: &'static str,
    pub child: &'static str,
    /// Coluna da tabela filha (ou da associação) que aponta para o pai
    pub foreign_key: &'static str,
    pub cardinality: Cardinality,
}

const fn one_to_many(parent: &'static str, child: &'static str, foreign_key: &'static str) -> Relation {
    Relation {
        parent,
        child,
        foreign_key,
        cardinality: Cardinality::OneToMany,
    }
}

/// APP_USER não se relaciona com nenhuma tabela
pub static RELATIONS: [Relation; 7] = [
    one_to_many("FACILITY", "AREA", "FACILITY_ID"),
    one_to_many("AREA", "ROOM", "AREA_ID"),
    Relation {
        parent: "DOCTOR",
        child: "AREA",
        foreign_key: "DOCTOR_ID",
        cardinality: Cardinality::ManyToMany { through: "DOCTOR_FACILITY" },
    },
    Relation {
        parent: "AREA",
        child: "DOCTOR",
        foreign_key: "AREA_ID",
        cardinality: Cardinality::ManyToMany { through: "DOCTOR_FACILITY" },
    },
    one_to_many("PATIENT", "APPOINTMENT", "PATIENT_ID"),
    one_to_many("DOCTOR", "APPOINTMENT", "DOCTOR_ID"),
    one_to_many("ROOM", "APPOINTMENT", "ROOM_ID"),
];

/// Busca a definição de uma tabela pelo nome
pub fn table(name: &str) -> Option<&'static TableDef> {
    TABLES.iter().copied().find(|t| t.name == name)
}

/// Relacionamentos em que a tabela é pai, sem repetição.
///
/// Para muitos-para-muitos a tabela que guarda a referência é a associação,
/// então ela é devolvida no lugar da tabela do outro lado.
pub fn referencing(parent: &str) -> Vec<(&'static str, &'static str)> {
    let mut refs: Vec<(&'static str, &'static str)> = Vec::new();
    for rel in RELATIONS.iter().filter(|r| r.parent == parent) {
        let holder = match rel.cardinality {
            Cardinality::OneToMany => rel.child,
            Cardinality::ManyToMany { through } => through,
        };
        if !refs.contains(&(holder, rel.foreign_key)) {
            refs.push((holder, rel.foreign_key));
        }
    }
    refs
}

/// Ordem de inserção compatível com as chaves estrangeiras.
///
/// Ordenação topológica estável: entre tabelas prontas, mantém a ordem de
/// `TABLES`.
pub fn insertion_order() -> Vec<&'static str> {
    let mut ordered: Vec<&'static str> = Vec::with_capacity(TABLES.len());
    while ordered.len() < TABLES.len() {
        let next = TABLES.iter().find(|t| {
            !ordered.contains(&t.name) && t.dependencies().iter().all(|d| ordered.contains(d))
        });
        match next {
            Some(t) => ordered.push(t.name),
            // ciclo: não acontece com o esquema atual
            None => break,
        }
    }
    ordered
}
