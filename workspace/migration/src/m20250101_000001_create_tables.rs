use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create industries table
        manager
            .create_table(
                Table::create()
                    .table(Industries::Table)
                    .if_not_exists()
                    .col(pk_auto(Industries::Id))
                    .col(string(Industries::Name))
                    .to_owned(),
            )
            .await?;

        // Create product_colors table
        manager
            .create_table(
                Table::create()
                    .table(ProductColors::Table)
                    .if_not_exists()
                    .col(pk_auto(ProductColors::Id))
                    .col(string(ProductColors::Name).unique_key())
                    .to_owned(),
            )
            .await?;

        // Create file_types table
        manager
            .create_table(
                Table::create()
                    .table(FileTypes::Table)
                    .if_not_exists()
                    .col(pk_auto(FileTypes::Id))
                    .col(string(FileTypes::Name).unique_key())
                    .to_owned(),
            )
            .await?;

        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::FirstName))
                    .col(string(Users::LastName))
                    .col(string(Users::Username).unique_key())
                    .col(string_null(Users::PhoneNumber).unique_key())
                    .col(string_null(Users::Email).unique_key())
                    .col(string_null(Users::NationalCode).unique_key())
                    .col(string(Users::PasswordHash))
                    .col(string(Users::Role))
                    .col(boolean(Users::Active).default(true))
                    .col(string_null(Users::StoreName))
                    .col(string_null(Users::StoreDescription))
                    .col(string_null(Users::StoreLogo))
                    .col(integer_null(Users::IndustryId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_industry")
                            .from(Users::Table, Users::IndustryId)
                            .to(Industries::Table, Industries::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create products table
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(pk_auto(Products::Id))
                    .col(integer(Products::OwnerId))
                    .col(integer_null(Products::IndustryId))
                    .col(string(Products::Title))
                    .col(text(Products::Description))
                    .col(decimal(Products::Price))
                    .col(string(Products::ProductType))
                    .col(boolean(Products::Active).default(true))
                    .col(integer_null(Products::Length))
                    .col(integer_null(Products::Width))
                    .col(integer_null(Products::Weight))
                    .col(integer_null(Products::ColorId))
                    .col(integer_null(Products::Size))
                    .col(integer_null(Products::FileTypeId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_owner")
                            .from(Products::Table, Products::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_industry")
                            .from(Products::Table, Products::IndustryId)
                            .to(Industries::Table, Industries::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_color")
                            .from(Products::Table, Products::ColorId)
                            .to(ProductColors::Table, ProductColors::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_file_type")
                            .from(Products::Table, Products::FileTypeId)
                            .to(FileTypes::Table, FileTypes::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create product_images table
        manager
            .create_table(
                Table::create()
                    .table(ProductImages::Table)
                    .if_not_exists()
                    .col(pk_auto(ProductImages::Id))
                    .col(integer(ProductImages::ProductId))
                    .col(string(ProductImages::Image))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_image_product")
                            .from(ProductImages::Table, ProductImages::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create main_images table (one designated cover image per product)
        manager
            .create_table(
                Table::create()
                    .table(MainImages::Table)
                    .if_not_exists()
                    .col(pk_auto(MainImages::Id))
                    .col(integer(MainImages::ProductId).unique_key())
                    .col(integer(MainImages::ProductImageId).unique_key())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_main_image_product")
                            .from(MainImages::Table, MainImages::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_main_image_product_image")
                            .from(MainImages::Table, MainImages::ProductImageId)
                            .to(ProductImages::Table, ProductImages::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create blogs table
        manager
            .create_table(
                Table::create()
                    .table(Blogs::Table)
                    .if_not_exists()
                    .col(pk_auto(Blogs::Id))
                    .col(integer(Blogs::ProductId))
                    .col(string(Blogs::Title))
                    .col(text(Blogs::Description))
                    .col(text(Blogs::Content))
                    .col(boolean(Blogs::Active).default(true))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_blog_product")
                            .from(Blogs::Table, Blogs::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create comments table
        manager
            .create_table(
                Table::create()
                    .table(Comments::Table)
                    .if_not_exists()
                    .col(pk_auto(Comments::Id))
                    .col(integer(Comments::BlogId))
                    .col(integer(Comments::UserId))
                    .col(text(Comments::Content))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_blog")
                            .from(Comments::Table, Comments::BlogId)
                            .to(Blogs::Table, Blogs::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_user")
                            .from(Comments::Table, Comments::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create carts table
        manager
            .create_table(
                Table::create()
                    .table(Carts::Table)
                    .if_not_exists()
                    .col(pk_auto(Carts::Id))
                    .col(integer(Carts::UserId).unique_key())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cart_user")
                            .from(Carts::Table, Carts::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create cart_items table; one row per (cart, product) pair
        manager
            .create_table(
                Table::create()
                    .table(CartItems::Table)
                    .if_not_exists()
                    .col(pk_auto(CartItems::Id))
                    .col(integer(CartItems::CartId))
                    .col(integer(CartItems::ProductId))
                    .col(integer(CartItems::Quantity))
                    .index(
                        Index::create()
                            .name("uq_cart_items_cart_product")
                            .col(CartItems::CartId)
                            .col(CartItems::ProductId)
                            .unique(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cart_item_cart")
                            .from(CartItems::Table, CartItems::CartId)
                            .to(Carts::Table, Carts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cart_item_product")
                            .from(CartItems::Table, CartItems::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CartItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Carts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Comments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Blogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MainImages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProductImages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FileTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProductColors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Industries::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    FirstName,
    LastName,
    Username,
    PhoneNumber,
    Email,
    NationalCode,
    PasswordHash,
    Role,
    Active,
    StoreName,
    StoreDescription,
    StoreLogo,
    IndustryId,
}

#[derive(DeriveIden)]
enum Industries {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum ProductColors {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum FileTypes {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    OwnerId,
    IndustryId,
    Title,
    Description,
    Price,
    ProductType,
    Active,
    Length,
    Width,
    Weight,
    ColorId,
    Size,
    FileTypeId,
}

#[derive(DeriveIden)]
enum ProductImages {
    Table,
    Id,
    ProductId,
    Image,
}

#[derive(DeriveIden)]
enum MainImages {
    Table,
    Id,
    ProductId,
    ProductImageId,
}

#[derive(DeriveIden)]
enum Blogs {
    Table,
    Id,
    ProductId,
    Title,
    Description,
    Content,
    Active,
}

#[derive(DeriveIden)]
enum Comments {
    Table,
    Id,
    BlogId,
    UserId,
    Content,
}

#[derive(DeriveIden)]
enum Carts {
    Table,
    Id,
    UserId,
}

#[derive(DeriveIden)]
enum CartItems {
    Table,
    Id,
    CartId,
    ProductId,
    Quantity,
}
