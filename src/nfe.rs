// src/nfe.rs

// Leitor do XML de NF-e de compra. Extraímos só o que o processamento
// usa: emitente, número, totais e itens. Campo obrigatório ausente ou
// ilegível vira erro de parse antes de qualquer escrita no banco.

use quick_xml::Reader;
use quick_xml::events::Event;
use rust_decimal::Decimal;

use crate::common::error::AppError;
use crate::models::invoice::InvoiceItem;

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedInvoice {
    pub supplier_tax_id: String,
    pub supplier_name: String,
    pub number: String,
    pub products_total: Decimal,
    pub icms_total: Decimal,
    pub total: Decimal,
    pub items: Vec<InvoiceItem>,
}

#[derive(Debug, Default)]
struct PartialItem {
    code: Option<String>,
    ean: Option<String>,
    description: Option<String>,
    quantity: Option<Decimal>,
    unit_value: Option<Decimal>,
    total_value: Option<Decimal>,
}

pub fn parse_purchase_invoice(xml: &str) -> Result<ParsedInvoice, AppError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    // Caminho de elementos abertos, por nome local. O mesmo nome de tag
    // aparece em contextos diferentes (vProd do item x vProd do total),
    // então o texto é interpretado pelo ancestral presente na pilha.
    let mut stack: Vec<String> = Vec::new();
    let mut current_item: Option<PartialItem> = None;

    let mut supplier_tax_id = None;
    let mut supplier_name = None;
    let mut number = None;
    let mut products_total = None;
    let mut icms_total = None;
    let mut total = None;
    let mut items: Vec<InvoiceItem> = Vec::new();

    loop {
        match reader.read_event() {
            Err(e) => return Err(AppError::Parse(format!("XML malformado: {e}"))),
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if name == "det" {
                    current_item = Some(PartialItem::default());
                }
                stack.push(name);
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if name == "det" {
                    let partial = current_item.take().unwrap_or_default();
                    items.push(finish_item(partial, items.len() + 1)?);
                }
                stack.pop();
            }
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| AppError::Parse(format!("XML malformado: {e}")))?
                    .trim()
                    .to_string();
                if text.is_empty() {
                    continue;
                }

                let Some(tag) = stack.last().map(String::as_str) else {
                    continue;
                };
                let inside = |ancestor: &str| stack.iter().any(|s| s == ancestor);

                if let Some(item) = current_item.as_mut() {
                    if inside("prod") {
                        match tag {
                            "cProd" => item.code = Some(text),
                            "cEAN" if text != "SEM GTIN" => item.ean = Some(text),
                            "xProd" => item.description = Some(text),
                            "qCom" => item.quantity = Some(decimal("qCom", &text)?),
                            "vUnCom" => item.unit_value = Some(decimal("vUnCom", &text)?),
                            "vProd" => item.total_value = Some(decimal("vProd", &text)?),
                            _ => {}
                        }
                    }
                    continue;
                }

                if inside("emit") {
                    match tag {
                        "CNPJ" => supplier_tax_id = Some(text),
                        "xNome" => supplier_name = Some(text),
                        _ => {}
                    }
                } else if inside("ide") {
                    if tag == "nNF" {
                        number = Some(text);
                    }
                } else if inside("ICMSTot") {
                    match tag {
                        "vProd" => products_total = Some(decimal("vProd", &text)?),
                        "vICMS" => icms_total = Some(decimal("vICMS", &text)?),
                        "vNF" => total = Some(decimal("vNF", &text)?),
                        _ => {}
                    }
                }
            }
            Ok(_) => {}
        }
    }

    if items.is_empty() {
        return Err(AppError::Parse("nota sem itens".to_string()));
    }

    Ok(ParsedInvoice {
        supplier_tax_id: required("CNPJ do emitente", supplier_tax_id)?,
        supplier_name: required("xNome do emitente", supplier_name)?,
        number: required("nNF", number)?,
        products_total: required("vProd do total", products_total)?,
        icms_total: required("vICMS do total", icms_total)?,
        total: required("vNF", total)?,
        items,
    })
}

fn finish_item(partial: PartialItem, position: usize) -> Result<InvoiceItem, AppError> {
    let item = InvoiceItem {
        code: required(&format!("cProd do item {position}"), partial.code)?,
        ean: partial.ean,
        description: required(&format!("xProd do item {position}"), partial.description)?,
        quantity: required(&format!("qCom do item {position}"), partial.quantity)?,
        unit_value: required(&format!("vUnCom do item {position}"), partial.unit_value)?,
        total_value: required(&format!("vProd do item {position}"), partial.total_value)?,
    };
    if item.quantity <= Decimal::ZERO {
        return Err(AppError::Parse(format!(
            "quantidade não positiva no item {position}"
        )));
    }
    Ok(item)
}

fn required<T>(field: &str, value: Option<T>) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::Parse(format!("campo obrigatório ausente: {field}")))
}

fn decimal(field: &str, raw: &str) -> Result<Decimal, AppError> {
    raw.parse::<Decimal>()
        .map_err(|_| AppError::Parse(format!("valor numérico inválido em <{field}>: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const NOTA_COMPLETA: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<nfeProc xmlns="http://www.portalfiscal.inf.br/nfe">
  <NFe>
    <infNFe Id="NFe35240112345678000199550010000123451000123456">
      <ide><cUF>35</cUF><nNF>12345</nNF><serie>1</serie></ide>
      <emit>
        <CNPJ>12345678000199</CNPJ>
        <xNome>Distribuidora Alfa LTDA</xNome>
      </emit>
      <dest><CNPJ>11111111000101</CNPJ><xNome>Empresa ABC</xNome></dest>
      <det nItem="1">
        <prod>
          <cProd>P-001</cProd>
          <cEAN>7891234567895</cEAN>
          <xProd>Parafuso sextavado</xProd>
          <qCom>10.0000</qCom>
          <vUnCom>2.5000</vUnCom>
          <vProd>25.00</vProd>
        </prod>
      </det>
      <det nItem="2">
        <prod>
          <cProd>P-002</cProd>
          <cEAN>SEM GTIN</cEAN>
          <xProd>Arruela lisa</xProd>
          <qCom>100.0000</qCom>
          <vUnCom>0.1000</vUnCom>
          <vProd>10.00</vProd>
        </prod>
      </det>
      <total>
        <ICMSTot>
          <vProd>35.00</vProd>
          <vICMS>4.20</vICMS>
          <vNF>35.00</vNF>
        </ICMSTot>
      </total>
    </infNFe>
  </NFe>
</nfeProc>"#;

    #[test]
    fn parse_nota_completa() {
        let nota = parse_purchase_invoice(NOTA_COMPLETA).unwrap();

        assert_eq!(nota.supplier_tax_id, "12345678000199");
        assert_eq!(nota.supplier_name, "Distribuidora Alfa LTDA");
        assert_eq!(nota.number, "12345");
        assert_eq!(nota.products_total, dec!(35.00));
        assert_eq!(nota.icms_total, dec!(4.20));
        assert_eq!(nota.total, dec!(35.00));

        assert_eq!(nota.items.len(), 2);
        assert_eq!(nota.items[0].code, "P-001");
        assert_eq!(nota.items[0].ean.as_deref(), Some("7891234567895"));
        assert_eq!(nota.items[0].quantity, dec!(10.0000));
        assert_eq!(nota.items[0].unit_value, dec!(2.5000));
        // "SEM GTIN" não é um EAN
        assert_eq!(nota.items[1].ean, None);
    }

    #[test]
    fn cnpj_do_dest_nao_vaza_para_o_emitente() {
        let nota = parse_purchase_invoice(NOTA_COMPLETA).unwrap();
        assert_ne!(nota.supplier_tax_id, "11111111000101");
    }

    #[test]
    fn total_ausente_e_erro_de_parse() {
        let sem_vnf = NOTA_COMPLETA.replace("<vNF>35.00</vNF>", "");
        match parse_purchase_invoice(&sem_vnf) {
            Err(AppError::Parse(msg)) => assert!(msg.contains("vNF"), "mensagem: {msg}"),
            other => panic!("esperava erro de parse, veio {other:?}"),
        }
    }

    #[test]
    fn nota_sem_itens_e_erro_de_parse() {
        let xml = r#"<NFe><infNFe>
            <ide><nNF>1</nNF></ide>
            <emit><CNPJ>12345678000199</CNPJ><xNome>Alfa</xNome></emit>
            <total><ICMSTot><vProd>0</vProd><vICMS>0</vICMS><vNF>0</vNF></ICMSTot></total>
        </infNFe></NFe>"#;
        assert!(matches!(
            parse_purchase_invoice(xml),
            Err(AppError::Parse(_))
        ));
    }

    #[test]
    fn numero_invalido_e_erro_de_parse() {
        let quebrado = NOTA_COMPLETA.replace("<qCom>10.0000</qCom>", "<qCom>dez</qCom>");
        match parse_purchase_invoice(&quebrado) {
            Err(AppError::Parse(msg)) => assert!(msg.contains("qCom"), "mensagem: {msg}"),
            other => panic!("esperava erro de parse, veio {other:?}"),
        }
    }
}
