//! 容量與可用量檢查

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use silo_core::{MovementRecord, Silo, SiloError, SiloLevel};

/// 出入庫檢查器
///
/// 全部為純函數，只讀取呼叫端傳入的料位快照。快照必須是剛重算的，
/// 否則並行寫入可能一起通過檢查。
pub struct AdmissionValidator;

impl AdmissionValidator {
    /// 數量必須大於 0
    pub fn validate_quantity(requested: Decimal) -> silo_core::Result<()> {
        if requested <= Decimal::ZERO {
            return Err(SiloError::InvalidQuantity(requested));
        }
        Ok(())
    }

    /// 入庫容量檢查：現有量 + 入庫量不可超過容量
    pub fn validate_inbound_capacity(
        silo: &Silo,
        level: &SiloLevel,
        requested: Decimal,
    ) -> silo_core::Result<()> {
        // 溢位必然超過容量
        let exceeds = level
            .current_quantity
            .checked_add(requested)
            .map_or(true, |projected| projected > silo.capacity);

        if exceeds {
            return Err(SiloError::CapacityExceeded {
                silo_name: silo.name.clone(),
                available_headroom: silo.headroom(level.current_quantity),
            });
        }

        Ok(())
    }

    /// 出庫可用量檢查：出庫量不可超過現有量
    pub fn validate_outbound_availability(
        silo: &Silo,
        level: &SiloLevel,
        requested: Decimal,
    ) -> silo_core::Result<()> {
        if requested > level.current_quantity {
            return Err(SiloError::InsufficientStock {
                silo_name: silo.name.clone(),
                available: level.current_quantity,
                requested,
            });
        }

        Ok(())
    }

    /// 時序檢查：新異動不可早於筒倉既有的最後一筆異動
    ///
    /// 帳本按時間重播，補登較早的異動會改變既有出庫扣到的批次，
    /// 使已保存的提取明細失效。同一時間允許（穩定排序排在既有異動之後）。
    pub fn validate_chronology<M: MovementRecord>(
        silo: &Silo,
        movement: &M,
        latest: Option<DateTime<Utc>>,
    ) -> silo_core::Result<()> {
        match latest {
            Some(latest) if movement.timestamp() < latest => {
                Err(SiloError::BackdatedMovement {
                    silo_name: silo.name.clone(),
                    kind: movement.kind(),
                    timestamp: movement.timestamp(),
                    latest,
                })
            }
            _ => Ok(()),
        }
    }

    /// 物料類型檢查：筒倉限定物料時，入庫聲明的物料必須相符
    pub fn validate_material(silo: &Silo, material_type: Option<&str>) -> silo_core::Result<()> {
        if silo.accepts_material(material_type) {
            return Ok(());
        }

        Err(SiloError::MaterialMismatch {
            silo_name: silo.name.clone(),
            expected: silo.material_type.clone().unwrap_or_default(),
            actual: material_type.unwrap_or_default().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use silo_core::Batch;
    use silo_core::{InboundMovement, MovementKind, OutboundMovement};

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, d, 0, 0, 0).unwrap()
    }

    fn level_with(silo: &Silo, current: i64) -> SiloLevel {
        let batches = if current > 0 {
            vec![Batch::from_inbound(&InboundMovement::new(
                silo.id.clone(),
                Decimal::from(current),
                Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            ))]
        } else {
            Vec::new()
        };
        SiloLevel::from_batches(silo.clone(), batches, Decimal::ZERO)
    }

    #[rstest]
    #[case(200, true)]
    #[case(1, true)]
    #[case(201, false)]
    fn test_capacity_boundary(#[case] requested: i64, #[case] ok: bool) {
        let silo = Silo::new("S1", "Silo 1", Decimal::from(1000));
        let level = level_with(&silo, 800);

        let result =
            AdmissionValidator::validate_inbound_capacity(&silo, &level, Decimal::from(requested));

        assert_eq!(result.is_ok(), ok);
    }

    #[test]
    fn test_capacity_overflow_is_exceeded() {
        let silo = Silo::new("S1", "Silo 1", Decimal::from(1000));
        let level = level_with(&silo, 10);

        let err = AdmissionValidator::validate_inbound_capacity(&silo, &level, Decimal::MAX)
            .unwrap_err();

        assert_eq!(
            err,
            SiloError::CapacityExceeded {
                silo_name: "Silo 1".to_string(),
                available_headroom: Decimal::from(990),
            }
        );
    }

    #[test]
    fn test_capacity_exceeded_reports_headroom() {
        let silo = Silo::new("S1", "Silo 1", Decimal::from(1000));
        let level = level_with(&silo, 800);

        let err = AdmissionValidator::validate_inbound_capacity(&silo, &level, Decimal::from(201))
            .unwrap_err();

        assert_eq!(
            err,
            SiloError::CapacityExceeded {
                silo_name: "Silo 1".to_string(),
                available_headroom: Decimal::from(200),
            }
        );
    }

    #[rstest]
    #[case(300, true)]
    #[case(301, false)]
    fn test_availability_boundary(#[case] requested: i64, #[case] ok: bool) {
        let silo = Silo::new("S2", "Silo 2", Decimal::from(1000));
        let level = level_with(&silo, 300);

        let result = AdmissionValidator::validate_outbound_availability(
            &silo,
            &level,
            Decimal::from(requested),
        );

        assert_eq!(result.is_ok(), ok);
    }

    #[test]
    fn test_insufficient_stock_details() {
        let silo = Silo::new("S2", "Silo 2", Decimal::from(1000));
        let level = level_with(&silo, 300);

        let err = AdmissionValidator::validate_outbound_availability(
            &silo,
            &level,
            Decimal::from(301),
        )
        .unwrap_err();

        assert_eq!(
            err,
            SiloError::InsufficientStock {
                silo_name: "Silo 2".to_string(),
                available: Decimal::from(300),
                requested: Decimal::from(301),
            }
        );
    }

    #[rstest]
    #[case(0)]
    #[case(-5)]
    fn test_non_positive_quantity_rejected(#[case] qty: i64) {
        assert!(matches!(
            AdmissionValidator::validate_quantity(Decimal::from(qty)),
            Err(SiloError::InvalidQuantity(_))
        ));
    }

    #[test]
    fn test_material_mismatch() {
        let silo = Silo::new("S3", "Corn Silo", Decimal::from(100)).with_material_type("corn");

        assert!(AdmissionValidator::validate_material(&silo, Some("corn")).is_ok());
        assert!(AdmissionValidator::validate_material(&silo, None).is_ok());

        let err = AdmissionValidator::validate_material(&silo, Some("wheat")).unwrap_err();
        assert!(matches!(err, SiloError::MaterialMismatch { ref actual, .. } if actual == "wheat"));
    }

    #[rstest]
    #[case(None, 1, true)]
    #[case(Some(2), 1, false)]
    #[case(Some(2), 2, true)]
    #[case(Some(2), 3, true)]
    fn test_chronology(#[case] latest: Option<u32>, #[case] at: u32, #[case] ok: bool) {
        let silo = Silo::new("S1", "Silo 1", Decimal::from(1000));
        let outbound = OutboundMovement::new("S1", Decimal::from(1), day(at));

        let result = AdmissionValidator::validate_chronology(&silo, &outbound, latest.map(day));

        assert_eq!(result.is_ok(), ok);
    }

    #[test]
    fn test_backdated_inbound_details() {
        let silo = Silo::new("S1", "Silo 1", Decimal::from(1000));
        let inbound = InboundMovement::new("S1", Decimal::from(1), day(1));

        let err = AdmissionValidator::validate_chronology(&silo, &inbound, Some(day(5)))
            .unwrap_err();

        assert_eq!(
            err,
            SiloError::BackdatedMovement {
                silo_name: "Silo 1".to_string(),
                kind: MovementKind::Inbound,
                timestamp: day(1),
                latest: day(5),
            }
        );
    }
}
