use std::collections::HashMap;
use std::sync::LazyLock;

/// Display names for catalog category ids. The catalog ships with the
/// upstream (English) ids; the storefront presents them in Portuguese.
static CATEGORY_NAMES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("All Appliances", "Eletrodomésticos"),
        ("All Car and Motorbike Products", "Automotivo e Motos"),
        ("All Electronics", "Eletrônicos"),
        ("All Exercise and Fitness", "Exercício e Fitness"),
        ("All Grocery and Gourmet Foods", "Mercearia e Gourmet"),
        ("All Home and Kitchen", "Casa e Cozinha"),
        ("All Pet Supplies", "Itens para Pets"),
        ("All Sports Fitness and Outdoors", "Esportes e Lazer"),
        ("Amazon Fashion", "Moda Amazon"),
        ("Air Conditioners", "Ar Condicionados"),
        ("All Video Games", "Video Games"),
        ("Baby Products", "Bebês"),
        ("Beauty and Personal Care", "Beleza e Cuidados"),
        ("Clothing and Accessories", "Roupas e Acessórios"),
        ("Computers and Accessories", "Computadores"),
        ("Industrial and Scientific", "Industrial e Científico"),
        ("Jewellery", "Joias"),
        ("Musical Instruments", "Instrumentos Musicais"),
        ("Office Products", "Escritório"),
        ("Pet Supplies", "Pets"),
        ("Software", "Software"),
        ("Sporting Goods", "Artigos Esportivos"),
        ("Toys and Games", "Brinquedos e Jogos"),
        ("Watches", "Relógios"),
        ("Cardio Equipment", "Equipamentos de Cardio"),
        ("Casual Shoes", "Calçados Casuais"),
        ("Clothing", "Vestuário"),
        ("Coffee Tea and Beverages", "Café, Chá e Bebidas"),
        ("Cricket", "Críquete"),
        ("Cycling", "Ciclismo"),
        ("Diapers", "Fraldas"),
        ("Diet and Nutrition", "Dieta e Nutrição"),
        ("Dog supplies", "Artigos para Cães"),
        ("Ethnic Wear", "Roupas Típicas"),
        ("Fashion and Silver Jewellery", "Joias de Prata e Moda"),
        ("Fitness Accessories", "Acessórios Fitness"),
        ("Garden and Outdoors", "Jardim e Exterior"),
        ("Health and Personal Care", "Saúde e Cuidados"),
        ("Home Audio", "Áudio para Casa"),
        ("Home Improvement", "Reforma e Casa"),
        ("Home Storage", "Organização e Casa"),
        ("Indoor Lighting", "Iluminação Interna"),
        ("Kitchen and Home Appliances", "Eletrodomésticos de Cozinha"),
        ("Laptops", "Notebooks"),
        ("Make-up", "Maquiagem"),
        ("Men's Accessories", "Acessórios Masculinos"),
        ("Men's Shoes", "Calçados Masculinos"),
        ("Mobile Phones", "Celulares"),
        ("Printers", "Impressoras"),
        ("Shoes", "Calçados"),
        ("Sports Shoes", "Tênis Esportivos"),
        ("Strollers and Prams", "Carrinhos de Bebê"),
        ("TV, Video and DVD", "TV e Vídeo"),
        ("Women's Accessories", "Acessórios Femininos"),
        ("Women's Shoes", "Calçados Femininos"),
        ("Refrigerators", "Geladeiras"),
        ("Washing Machines", "Máquinas de Lavar"),
        ("Televisions", "Televisões"),
        ("Cameras", "Câmeras"),
        ("Headphones", "Fones de Ouvido"),
        ("Speakers", "Alto-falantes"),
        ("Heating and Cooling Appliances", "Aquecimento e Refrigeração"),
        ("Personal Care Appliances", "Aparelhos de Cuidados Pessoais"),
    ])
});

/// Translate a catalog category id into its display name.
///
/// Ids without an explicit translation fall back to the id with the
/// "All " prefix and "Products" suffix stripped.
#[inline]
pub fn translate_category(category: &str) -> String {
    CATEGORY_NAMES.get(category).map_or_else(
        || {
            category
                .replace("All ", "")
                .replace("Products", "")
                .trim()
                .to_string()
        },
        |name| (*name).to_string(),
    )
}
