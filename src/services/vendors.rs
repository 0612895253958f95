//! Local service vendors and their lifetime billed totals.

use validator::Validate;

use crate::SERVICE_ADMIN_ROLE;
use crate::domain::auth::AuthenticatedUser;
use crate::domain::invoice::CostCategory;
use crate::domain::types::Currency;
use crate::domain::vendor::NewVendor;
use crate::dto::vendors::{VendorRow, VendorsPageData};
use crate::forms::vendors::AddVendorForm;
use crate::repository::{VendorReader, VendorWriter};
use crate::routes::ensure_role;
use crate::services::{ServiceError, ServiceResult};

pub(crate) fn category_names() -> Vec<&'static str> {
    CostCategory::ALL.iter().map(|c| c.as_str()).collect()
}

/// Loads the vendor directory with billed totals. Vendors bill in yen,
/// so the totals render as yen regardless of invoice currencies.
pub fn load_vendors_page<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<VendorsPageData>
where
    R: VendorReader + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let vendors = repo
        .list_vendors(user.branch_id)
        .map_err(|err| {
            log::error!("Failed to list vendors: {err}");
            err
        })?
        .into_iter()
        .map(|(vendor, billed)| VendorRow {
            category_label: vendor.category.as_str().to_string(),
            billed_display: Currency::Jpy.format_minor(billed),
            vendor,
        })
        .collect();

    Ok(VendorsPageData {
        vendors,
        categories: category_names(),
    })
}

pub fn add_vendor<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AddVendorForm,
) -> ServiceResult<()>
where
    R: VendorWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    if form.validate().is_err() {
        return Err(ServiceError::Form("Invalid form input".to_string()));
    }

    let category: CostCategory = form.category.parse()?;
    let vendor = NewVendor::new(
        user.branch_id,
        &form.name,
        Some(&form.email),
        Some(&form.phone),
        category,
    )?;

    repo.create_vendor(&vendor).map_err(|err| {
        log::error!("Failed to create vendor: {err}");
        err
    })?;

    Ok(())
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;

    use crate::SERVICE_ACCESS_ROLE;
    use crate::domain::vendor::Vendor;
    use crate::repository::mock::MockRepository;

    fn admin_user() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "1".to_string(),
            email: "admin@example.com".to_string(),
            branch_id: 42,
            name: "Admin".to_string(),
            roles: vec![
                SERVICE_ACCESS_ROLE.to_string(),
                SERVICE_ADMIN_ROLE.to_string(),
            ],
            exp: 0,
        }
    }

    fn staff_user() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "3".to_string(),
            email: "rep@example.com".to_string(),
            branch_id: 42,
            name: "Rep".to_string(),
            roles: vec![SERVICE_ACCESS_ROLE.to_string()],
            exp: 0,
        }
    }

    /// The vendor directory is an admin page.
    #[test]
    fn vendors_page_requires_admin() {
        let mut repo = MockRepository::new();
        repo.expect_list_vendors().times(0);

        let result = load_vendors_page(&repo, &staff_user());
        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    /// Billed totals render as yen.
    #[test]
    fn billed_totals_are_formatted_as_yen() {
        let mut repo = MockRepository::new();
        repo.expect_list_vendors()
            .withf(|branch_id| *branch_id == 42)
            .times(1)
            .returning(|branch_id| {
                let now = chrono::NaiveDate::from_ymd_opt(2026, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap();
                Ok(vec![(
                    Vendor {
                        id: 7,
                        branch_id,
                        name: "Yokohama Auto Works".to_string(),
                        email: None,
                        phone: None,
                        category: CostCategory::Repair,
                        created_at: now,
                    },
                    152_000,
                )])
            });

        let page = load_vendors_page(&repo, &admin_user()).expect("should load");

        assert_eq!(page.vendors.len(), 1);
        assert_eq!(page.vendors[0].billed_display, "¥152,000");
        assert_eq!(page.vendors[0].category_label, "repair");
    }

    /// Unknown categories never reach the repository.
    #[test]
    fn add_vendor_rejects_unknown_categories() {
        let mut repo = MockRepository::new();
        repo.expect_create_vendor().times(0);

        let form = AddVendorForm {
            name: "Yokohama Auto Works".to_string(),
            email: String::new(),
            phone: String::new(),
            category: "landscaping".to_string(),
        };

        let result = add_vendor(&repo, &admin_user(), form);
        assert!(matches!(result, Err(ServiceError::TypeConstraint(_))));
    }

    #[test]
    fn add_vendor_records_the_category() {
        let mut repo = MockRepository::new();
        repo.expect_create_vendor()
            .withf(|vendor| {
                vendor.category == CostCategory::Shipping && vendor.name == "Pacific Freight"
            })
            .times(1)
            .returning(|vendor| {
                let now = chrono::NaiveDate::from_ymd_opt(2026, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap();
                Ok(Vendor {
                    id: 8,
                    branch_id: vendor.branch_id,
                    name: vendor.name.clone(),
                    email: vendor.email.clone(),
                    phone: vendor.phone.clone(),
                    category: vendor.category,
                    created_at: now,
                })
            });

        let form = AddVendorForm {
            name: "Pacific Freight".to_string(),
            email: "billing@pacific-freight.example".to_string(),
            phone: String::new(),
            category: "shipping".to_string(),
        };

        add_vendor(&repo, &admin_user(), form).expect("should create");
    }
}
