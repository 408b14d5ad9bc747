//! Listas fixas usadas na geração de nomes

/// Nomes de hospitais. Esgotada a lista, o seed usa `Hospital N`.
pub const HOSPITALS: &[&str] = &[
    "Hospital Santa Luzia",
    "Hospital São Lucas",
    "Hospital Santa Casa de Misericórdia",
    "Hospital Nossa Senhora das Graças",
    "Hospital Universitário Central",
    "Hospital Municipal São José",
    "Hospital Regional do Norte",
    "Hospital Regional do Sul",
    "Hospital Infantil Sabará",
    "Hospital Santa Catarina",
    "Hospital Santa Marcelina",
    "Hospital São Camilo",
    "Hospital Alemão Oswaldo Cruz",
    "Hospital Sírio-Libanês",
    "Hospital Moinhos de Vento",
    "Hospital Mãe de Deus",
    "Hospital Português",
    "Hospital Espanhol",
    "Hospital Israelita",
    "Hospital Santa Izabel",
    "Hospital das Clínicas",
    "Hospital do Coração",
    "Hospital Dom Pedro II",
    "Hospital Evangélico",
    "Hospital Memorial",
    "Hospital Santa Rita",
    "Hospital São Vicente de Paulo",
    "Hospital Beneficência Portuguesa",
    "Hospital Albert Sabin",
    "Hospital Geral do Estado",
    "Clínica São Francisco",
    "Clínica Santa Mônica",
    "Policlínica Central",
    "Maternidade Santa Joana",
    "Instituto do Câncer",
    "Instituto de Ortopedia",
    "Pronto-Socorro Municipal",
    "Centro Médico Vida",
    "Centro de Reabilitação Esperança",
    "Hospital Vila Nova",
];

/// Nomes de áreas (especialidades e setores)
pub const AREAS: &[&str] = &[
    "Cardiologia",
    "Pediatria",
    "Ortopedia",
    "Neurologia",
    "Oncologia",
    "Ginecologia",
    "Obstetrícia",
    "Dermatologia",
    "Oftalmologia",
    "Otorrinolaringologia",
    "Urologia",
    "Nefrologia",
    "Pneumologia",
    "Gastroenterologia",
    "Endocrinologia",
    "Psiquiatria",
    "Radiologia",
    "Anestesiologia",
    "Emergência",
    "Terapia Intensiva",
    "Cirurgia Geral",
    "Clínica Médica",
    "Geriatria",
    "Reumatologia",
    "Hematologia",
    "Infectologia",
    "Fisioterapia",
    "Nutrição",
];
